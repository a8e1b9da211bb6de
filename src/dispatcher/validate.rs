// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command validation against the current device state.

use std::ops::RangeInclusive;

use super::{Change, Target};
use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::model::{Device, TankOperation};

/// Longest accepted holiday, in days.
const MAX_HOLIDAY_DAYS: u16 = 365;

/// Checks that `change` can be applied to `target` on `device`.
///
/// Runs before any mutation; a failure leaves the device untouched.
pub(crate) fn validate(
    device: &Device,
    target: Target,
    change: &Change,
    config: &EngineConfig,
) -> Result<(), ValidationError> {
    change.kind_for(target)?;

    match target {
        Target::Zone(id) if device.zone(id).is_none() => {
            return Err(ValidationError::UnknownZone(id.value()));
        }
        Target::Tank if !device.has_tank() => return Err(ValidationError::NoTank),
        _ => {}
    }

    match *change {
        Change::TargetTemperature(value) => {
            let (field, range) = match target {
                Target::Tank => ("tank target temperature", config.tank_range()),
                _ => ("zone target temperature", config.zone_range()),
            };
            check_range(field, value, &range)
        }
        Change::TankOperation(operation) => {
            // Eco and comfort move the tank target to an upstream preset.
            let preset = device.tank().and_then(|tank| match operation {
                TankOperation::Eco => Some(tank.eco_target),
                TankOperation::Comfort => Some(tank.comfort_target),
                TankOperation::Normal | TankOperation::ForceHotWater => None,
            });
            match preset {
                Some(value) => {
                    check_range("tank target temperature", value, &config.tank_range())
                }
                None => Ok(()),
            }
        }
        Change::Feature { feature, .. } if feature.requires_tank() && !device.has_tank() => {
            Err(ValidationError::NoTank)
        }
        Change::Holiday {
            enabled: true,
            days: Some(days),
        } if !(1..=MAX_HOLIDAY_DAYS).contains(&days) => {
            Err(ValidationError::InvalidHolidayDays(days))
        }
        _ => Ok(()),
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    if !range.contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            actual: value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Feature, Tank, Zone, ZoneId};

    fn device(with_tank: bool) -> Device {
        let device = Device::new("hp-1", "Heat pump", "default")
            .with_zone(Zone::with_defaults(ZoneId::FIRST));
        if with_tank {
            device.with_tank(Tank::default())
        } else {
            device
        }
    }

    fn check(device: &Device, target: Target, change: Change) -> Result<(), ValidationError> {
        validate(device, target, &change, &EngineConfig::default())
    }

    #[test]
    fn zone_target_in_range() {
        let zone = Target::Zone(ZoneId::FIRST);
        assert!(check(&device(false), zone, Change::TargetTemperature(21.0)).is_ok());
        assert!(check(&device(false), zone, Change::TargetTemperature(-5.0)).is_ok());
        assert!(check(&device(false), zone, Change::TargetTemperature(30.0)).is_ok());
    }

    #[test]
    fn zone_target_out_of_range() {
        let err = check(
            &device(false),
            Target::Zone(ZoneId::FIRST),
            Change::TargetTemperature(31.0),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { actual, .. } if actual == 31.0));
    }

    #[test]
    fn non_finite_rejected() {
        let err = check(
            &device(true),
            Target::Tank,
            Change::TargetTemperature(f64::NAN),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::NotFinite("tank target temperature"));
    }

    #[test]
    fn unknown_zone() {
        let err = check(
            &device(false),
            Target::Zone(ZoneId::new(4).unwrap()),
            Change::TargetTemperature(20.0),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::UnknownZone(4));
    }

    #[test]
    fn tank_changes_need_a_tank() {
        assert_eq!(
            check(&device(false), Target::Tank, Change::Running(true)),
            Err(ValidationError::NoTank)
        );
        assert_eq!(
            check(
                &device(false),
                Target::Device,
                Change::Feature {
                    feature: Feature::ForceHotWater,
                    enabled: true
                }
            ),
            Err(ValidationError::NoTank)
        );
        assert!(check(&device(true), Target::Tank, Change::TargetTemperature(50.0)).is_ok());
    }

    #[test]
    fn tank_range_applies_to_tank() {
        assert!(check(&device(true), Target::Tank, Change::TargetTemperature(30.0)).is_err());
    }

    #[test]
    fn holiday_days_bounds() {
        let holiday = |days| Change::Holiday {
            enabled: true,
            days: Some(days),
        };
        assert!(check(&device(false), Target::Device, holiday(1)).is_ok());
        assert!(check(&device(false), Target::Device, holiday(365)).is_ok());
        assert_eq!(
            check(&device(false), Target::Device, holiday(0)),
            Err(ValidationError::InvalidHolidayDays(0))
        );
        assert_eq!(
            check(&device(false), Target::Device, holiday(366)),
            Err(ValidationError::InvalidHolidayDays(366))
        );
    }

    #[test]
    fn disabling_holiday_ignores_days() {
        let off = Change::Holiday {
            enabled: false,
            days: Some(0),
        };
        assert!(check(&device(false), Target::Device, off).is_ok());
    }

    #[test]
    fn tank_operation_checks_preset_target() {
        let device = device(false).with_tank(Tank {
            eco_target: 30.0,
            ..Tank::default()
        });

        assert_eq!(
            check(&device, Target::Tank, Change::TankOperation(TankOperation::Eco)),
            Err(ValidationError::OutOfRange {
                field: "tank target temperature",
                min: 40.0,
                max: 75.0,
                actual: 30.0,
            })
        );
        for operation in [TankOperation::Comfort, TankOperation::Normal] {
            assert!(check(&device, Target::Tank, Change::TankOperation(operation)).is_ok());
        }
    }

    #[test]
    fn tank_switches_need_a_tank() {
        for feature in [Feature::Legionella, Feature::Reheat] {
            let change = Change::Feature {
                feature,
                enabled: true,
            };
            assert_eq!(
                check(&device(false), Target::Device, change),
                Err(ValidationError::NoTank)
            );
            assert!(check(&device(true), Target::Device, change).is_ok());
        }
    }

    #[test]
    fn unsupported_pair_rejected() {
        assert!(matches!(
            check(&device(true), Target::Device, Change::Running(true)),
            Err(ValidationError::UnsupportedChange { .. })
        ));
    }
}
