// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalization of upstream payloads into the canonical model.
//!
//! [`normalize`] accepts both payload shapes of
//! [`RawStatus`] and always produces a fully populated
//! [`Device`]. Each field is resolved in this order:
//!
//! 1. the structured field, if present and valid;
//! 2. the equivalent key of the untyped document (the document itself, or
//!    the `extra` document of a structured payload);
//! 3. the documented default.
//!
//! Bad optional data never fails normalization. It is reported as a
//! [`DataQualityWarning`] and replaced by the default.
//!
//! # Examples
//!
//! ```
//! use heatlink::adapter::normalize;
//! use heatlink::model::ZoneId;
//! use heatlink::remote::{DeviceInfo, RawStatus, ZoneInfo};
//! use serde_json::json;
//!
//! let info = DeviceInfo::new("hp-1").with_zone(ZoneInfo::new(ZoneId::FIRST));
//! let raw = RawStatus::Document(json!({
//!     "status": {"zoneStatus": [{"zoneId": 1, "temperatureNow": 56, "heatSet": 5}]}
//! }));
//!
//! let (device, warnings) = normalize(&info, &raw).unwrap();
//! let zone = device.zone(ZoneId::FIRST).unwrap();
//! assert!((zone.current_temperature - 5.6).abs() < 1e-9);
//! assert!((zone.target_temperature - 6.1).abs() < 1e-9);
//! assert!(warnings.is_empty());
//! ```

mod document;
pub mod units;
mod zones;

use std::fmt;

use document::Fields;

use crate::error::AdapterError;
use crate::model::{Device, StatusFlags, SystemMode, ZoneId};
use crate::remote::{DeviceInfo, RawStatus, StructuredStatus};

/// Display name used when neither the device info nor the payload has one.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// A non-fatal problem found while normalizing a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQualityWarning {
    /// A value had the wrong type or was out of range, and was ignored.
    Malformed {
        /// Path of the offending field.
        field: String,
        /// What was expected.
        expected: &'static str,
    },
    /// Upstream reported a zone that is not in the device's manifest.
    UnknownZone(ZoneId),
    /// Upstream reported the same zone twice; the first one was kept.
    DuplicateZone(ZoneId),
    /// Tank data was reported for a device without a tank.
    UnexpectedTank,
    /// The `operationMode` code is not known.
    UnknownSystemMode(i64),
}

impl DataQualityWarning {
    pub(crate) fn malformed(field: impl Into<String>, expected: &'static str) -> Self {
        Self::Malformed {
            field: field.into(),
            expected,
        }
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { field, expected } => {
                write!(f, "{field} ignored, expected {expected}")
            }
            Self::UnknownZone(id) => write!(f, "zone {id} is not in the device manifest"),
            Self::DuplicateZone(id) => write!(f, "zone {id} reported more than once"),
            Self::UnexpectedTank => f.write_str("tank data reported for a device without a tank"),
            Self::UnknownSystemMode(code) => write!(f, "unknown operation mode code {code}"),
        }
    }
}

/// Rejects non-finite structured values, with a warning.
pub(crate) fn finite(
    value: Option<f64>,
    field: &'static str,
    warnings: &mut Vec<DataQualityWarning>,
) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(_) => {
            warnings.push(DataQualityWarning::malformed(field, "a finite number"));
            None
        }
        None => None,
    }
}

/// Converts a raw status payload into a canonical [`Device`].
///
/// # Errors
///
/// Returns [`AdapterError::MissingIdentity`] if the device id is blank, and
/// [`AdapterError::IdentityMismatch`] if the payload names another device.
pub fn normalize(
    info: &DeviceInfo,
    raw: &RawStatus,
) -> Result<(Device, Vec<DataQualityWarning>), AdapterError> {
    if info.id.trim().is_empty() {
        return Err(AdapterError::MissingIdentity);
    }

    let mut warnings = Vec::new();
    let (structured, document) = match raw {
        RawStatus::Structured(status) => (Some(status.as_ref()), status.extra.as_ref()),
        RawStatus::Document(document) => (None, Some(document)),
    };
    let (root, status) = match document {
        Some(document) => Fields::split(document, &mut warnings),
        None => (Fields::empty(), Fields::empty()),
    };

    let payload_id = structured
        .and_then(|s| s.id.as_deref())
        .filter(|id| !id.trim().is_empty())
        .or_else(|| root.text(&["deviceGuid", "deviceId", "id"], &mut warnings));
    if let Some(found) = payload_id
        && found != info.id
    {
        return Err(AdapterError::IdentityMismatch {
            expected: info.id.clone(),
            found: found.to_string(),
        });
    }

    let display_name = info
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| root.text(&["a2wName"], &mut warnings))
        .or_else(|| structured.and_then(|s| s.name.as_deref()))
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(UNKNOWN_DEVICE_NAME);

    let system_mode = resolve_system_mode(structured, &status, &mut warnings);
    let flags = resolve_flags(structured, &status, &mut warnings);
    let zones = zones::resolve_zones(
        info,
        structured.and_then(|s| s.zones.as_deref()),
        &status,
        &mut warnings,
    );

    let structured_tank = structured.and_then(|s| s.tank.as_ref());
    let document_tank = status.object("tankStatus", &mut warnings);
    let tank = if info.has_tank {
        Some(zones::build_tank(
            structured_tank,
            document_tank.as_ref(),
            &mut warnings,
        ))
    } else {
        if structured_tank.is_some() || document_tank.is_some() {
            warnings.push(DataQualityWarning::UnexpectedTank);
        }
        None
    };

    let mut device = Device::new(info.id.clone(), display_name, info.device_class.clone())
        .with_system_mode(system_mode)
        .with_flags(flags);
    for zone in zones {
        device = device.with_zone(zone);
    }
    if let Some(tank) = tank {
        device = device.with_tank(tank);
    }

    Ok((device, warnings))
}

fn resolve_system_mode(
    structured: Option<&StructuredStatus>,
    status: &Fields<'_>,
    warnings: &mut Vec<DataQualityWarning>,
) -> SystemMode {
    if let Some(mode) = structured.and_then(|s| s.system_mode) {
        return mode;
    }
    match status.integer(&["operationMode"], warnings) {
        Some(code) => SystemMode::from_code(code).unwrap_or_else(|| {
            warnings.push(DataQualityWarning::UnknownSystemMode(code));
            SystemMode::default()
        }),
        None => SystemMode::default(),
    }
}

fn resolve_flags(
    structured: Option<&StructuredStatus>,
    status: &Fields<'_>,
    warnings: &mut Vec<DataQualityWarning>,
) -> StatusFlags {
    let defaults = StatusFlags::default();
    let s = structured;

    let mut flag = |value: Option<bool>, keys: &'static [&'static str], default: bool| {
        value
            .or_else(|| status.flag(keys, warnings))
            .unwrap_or(default)
    };
    let quiet = flag(s.and_then(|s| s.quiet), &["quietMode"], defaults.quiet);
    let powerful = flag(s.and_then(|s| s.powerful), &["powerful"], defaults.powerful);
    let eco = flag(s.and_then(|s| s.eco), &["ecoMode"], defaults.eco);
    let comfort = flag(s.and_then(|s| s.comfort), &["comfortMode"], defaults.comfort);
    let holiday = flag(s.and_then(|s| s.holiday), &["holidayMode"], defaults.holiday);
    let force_heater = flag(s.and_then(|s| s.force_heater), &["forceHeater"], defaults.force_heater);
    let force_hot_water = flag(
        s.and_then(|s| s.force_hot_water),
        &["forceDHW"],
        defaults.force_hot_water,
    );
    let dhw_priority = flag(s.and_then(|s| s.dhw_priority), &["dhwPriority"], defaults.dhw_priority);
    let schedule_enabled = flag(
        s.and_then(|s| s.schedule_enabled),
        &["scheduleEnabled"],
        defaults.schedule_enabled,
    );
    let defrost = flag(s.and_then(|s| s.defrost), &["defrostMode"], defaults.defrost);
    let external_heater = flag(
        s.and_then(|s| s.external_heater),
        &["externalHeater"],
        defaults.external_heater,
    );

    let holiday_days = s
        .and_then(|s| s.holiday_days)
        .or_else(|| status.unsigned(&["holidayDays", "holidayTimer"], warnings))
        .unwrap_or(defaults.holiday_days);
    let outdoor_temperature = s
        .and_then(|s| finite(s.outdoor_temperature, "outdoor_temperature", warnings))
        .or_else(|| status.temperature(units::OUTDOOR, 0.0, warnings))
        .unwrap_or(defaults.outdoor_temperature);
    let water_pressure = s
        .and_then(|s| finite(s.water_pressure, "water_pressure", warnings))
        .or_else(|| status.number(&["waterPressure"], warnings))
        .unwrap_or(defaults.water_pressure);
    let pump_duty = s
        .and_then(|s| s.pump_duty)
        .or_else(|| status.unsigned(&["pumpDuty"], warnings))
        .unwrap_or(defaults.pump_duty);

    StatusFlags {
        quiet,
        powerful,
        eco,
        comfort,
        holiday,
        holiday_days,
        force_heater,
        force_hot_water,
        dhw_priority,
        schedule_enabled,
        defrost,
        external_heater,
        outdoor_temperature,
        water_pressure,
        pump_duty,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Tank;
    use crate::remote::{StructuredTank, StructuredZone, ZoneInfo};

    fn zone(id: u8) -> ZoneId {
        ZoneId::new(id).unwrap()
    }

    fn info() -> DeviceInfo {
        DeviceInfo::new("hp-1")
            .with_name("Heat pump")
            .with_zone(ZoneInfo::new(zone(1)).with_name("House"))
            .with_tank()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_document_is_fully_defaulted() {
        let (device, warnings) = normalize(&info(), &RawStatus::Document(json!({}))).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(device.display_name(), "Heat pump");
        assert_eq!(device.system_mode(), SystemMode::Heat);
        assert_eq!(device.flags(), &StatusFlags::default());
        assert_eq!(device.tank(), Some(&Tank::default()));

        let zone = device.zone(zone(1)).unwrap();
        assert_eq!(zone.name, "House");
        assert!(close(zone.current_temperature, 20.0));
        assert!(close(zone.target_temperature, 22.0));
        assert!(zone.running);
        assert!(close(zone.eco_offset, -2.0));
        assert!(close(zone.comfort_offset, 1.0));
    }

    #[test]
    fn realistic_document() {
        let raw = RawStatus::Document(json!({
            "a2wName": "Langagervej",
            "status": {
                "operationMode": 1,
                "quietMode": 0,
                "powerful": 0,
                "forceDHW": 0,
                "pumpDuty": 1,
                "waterPressure": 2.28,
                "outdoorNow": 5,
                "holidayTimer": 0,
                "zoneStatus": [{
                    "zoneId": 1,
                    "zoneName": "House",
                    "operationStatus": 1,
                    "temperatureNow": 51,
                    "heatSet": 5,
                    "ecoHeat": -5,
                    "comfortHeat": 5
                }],
                "tankStatus": {"operationStatus": 1, "temperatureNow": 59, "heatSet": 60}
            }
        }));
        let info = DeviceInfo::new("B497204181").with_zone(ZoneInfo::new(zone(1))).with_tank();
        let (device, warnings) = normalize(&info, &raw).unwrap();

        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(device.display_name(), "Langagervej");
        assert!(close(device.flags().water_pressure, 2.28));
        assert!(close(device.flags().outdoor_temperature, 5.0));

        let zone = device.zone(zone(1)).unwrap();
        assert!(close(zone.current_temperature, 5.1));
        assert!(close(zone.target_temperature, 5.6));
        assert!(close(zone.eco_offset, -0.5));
        assert!(close(zone.comfort_offset, 0.5));

        let tank = device.tank().unwrap();
        assert!(close(tank.current_temperature, 59.0));
        assert!(close(tank.target_temperature, 60.0));
    }

    #[test]
    fn unknown_zone_is_dropped() {
        let raw = RawStatus::Document(json!({
            "zoneStatus": [{"zoneId": 1, "temperatureNow": 200}, {"zoneId": 3}]
        }));
        let (device, warnings) = normalize(&info(), &raw).unwrap();

        assert_eq!(device.zones().len(), 1);
        assert_eq!(warnings, vec![DataQualityWarning::UnknownZone(zone(3))]);
    }

    #[test]
    fn missing_manifest_zone_is_defaulted() {
        let info = info().with_zone(ZoneInfo::new(zone(2)));
        let raw = RawStatus::Document(json!({"zoneStatus": [{"zoneId": 1}]}));
        let (device, _) = normalize(&info, &raw).unwrap();

        let ids: Vec<u8> = device.zones().iter().map(|z| z.id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(device.zone(zone(2)).unwrap().name, "Zone 2");
    }

    #[test]
    fn empty_manifest_accepts_all_zones() {
        let info = DeviceInfo::new("hp-1");
        let raw = RawStatus::Document(json!({
            "zoneStatus": [{"zoneId": 2}, {"zoneId": 1}, {"zoneId": 2}]
        }));
        let (device, warnings) = normalize(&info, &raw).unwrap();

        let ids: Vec<u8> = device.zones().iter().map(|z| z.id.value()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(warnings, vec![DataQualityWarning::DuplicateZone(zone(2))]);
    }

    #[test]
    fn tank_on_tankless_device_is_dropped() {
        let info = DeviceInfo::new("hp-1");
        let raw = RawStatus::Document(json!({"tankStatus": {"heatSet": 50}}));
        let (device, warnings) = normalize(&info, &raw).unwrap();

        assert!(!device.has_tank());
        assert_eq!(warnings, vec![DataQualityWarning::UnexpectedTank]);
    }

    #[test]
    fn malformed_values_fall_back_with_warnings() {
        let raw = RawStatus::Document(json!({
            "operationMode": 9,
            "ecoMode": "on",
            "zoneStatus": [{"zoneId": 1, "temperatureNow": "hot"}]
        }));
        let (device, warnings) = normalize(&info(), &raw).unwrap();

        assert_eq!(device.system_mode(), SystemMode::Heat);
        assert!(!device.flags().eco);
        assert!(close(device.zone(zone(1)).unwrap().current_temperature, 20.0));
        assert_eq!(warnings.len(), 3);
        assert!(warnings.contains(&DataQualityWarning::UnknownSystemMode(9)));
    }

    #[test]
    fn structured_wins_over_extra_document() {
        let status = StructuredStatus {
            quiet: Some(true),
            zones: Some(vec![StructuredZone {
                id: 1,
                target_temperature: Some(23.5),
                ..StructuredZone::default()
            }]),
            tank: Some(StructuredTank {
                target_temperature: Some(f64::NAN),
                ..StructuredTank::default()
            }),
            extra: Some(json!({
                "quietMode": 0,
                "powerful": 1,
                "zoneStatus": [{"zoneId": 1, "temperatureNow": 215, "heatSet": 30}],
                "tankStatus": {"heatSet": 48}
            })),
            ..StructuredStatus::default()
        };
        let (device, warnings) = normalize(&info(), &status.into()).unwrap();

        assert!(device.flags().quiet);
        assert!(device.flags().powerful);
        let zone = device.zone(zone(1)).unwrap();
        assert!(close(zone.current_temperature, 21.5));
        assert!(close(zone.target_temperature, 23.5));
        assert!(close(device.tank().unwrap().target_temperature, 48.0));
        assert_eq!(
            warnings,
            vec![DataQualityWarning::malformed("tank.target_temperature", "a finite number")]
        );
    }

    #[test]
    fn display_name_fallbacks() {
        let bare = DeviceInfo::new("hp-1");

        let structured = StructuredStatus {
            name: Some("From payload".to_string()),
            ..StructuredStatus::default()
        };
        let (device, _) = normalize(&bare, &structured.into()).unwrap();
        assert_eq!(device.display_name(), "From payload");

        let (device, _) = normalize(&bare, &RawStatus::Document(json!({}))).unwrap();
        assert_eq!(device.display_name(), UNKNOWN_DEVICE_NAME);
    }

    #[test]
    fn blank_identity_fails() {
        let err = normalize(&DeviceInfo::new("  "), &RawStatus::Document(json!({}))).unwrap_err();
        assert_eq!(err, AdapterError::MissingIdentity);
    }

    #[test]
    fn foreign_payload_fails() {
        let raw = RawStatus::Document(json!({"deviceGuid": "hp-2"}));
        let err = normalize(&info(), &raw).unwrap_err();
        assert_eq!(
            err,
            AdapterError::IdentityMismatch {
                expected: "hp-1".to_string(),
                found: "hp-2".to_string(),
            }
        );
    }

    #[test]
    fn holiday_days_accepts_both_keys() {
        let raw = RawStatus::Document(json!({"holidayMode": true, "holidayDays": 7}));
        let (device, _) = normalize(&info(), &raw).unwrap();
        assert!(device.flags().holiday);
        assert_eq!(device.flags().holiday_days, 7);
    }
}
