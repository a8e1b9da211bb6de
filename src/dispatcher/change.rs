// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command targets and changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::{ArgShape, ChangeKind};
use crate::error::ValidationError;
use crate::model::{Feature, Preset, SystemMode, TankOperation, ZoneId};
use crate::remote::OperationArg;

/// The part of a device a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The device as a whole.
    Device,
    /// One heating zone.
    Zone(ZoneId),
    /// The hot-water tank.
    Tank,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => f.write_str("device"),
            Self::Zone(id) => write!(f, "zone {id}"),
            Self::Tank => f.write_str("tank"),
        }
    }
}

/// A requested state change.
///
/// | target | change | kind |
/// |---|---|---|
/// | zone | [`Change::TargetTemperature`] | [`ChangeKind::ZoneTargetTemperature`] |
/// | tank | [`Change::TargetTemperature`] | [`ChangeKind::TankTargetTemperature`] |
/// | tank | [`Change::Running`] | [`ChangeKind::TankPower`] |
/// | tank | [`Change::TankOperation`] | [`ChangeKind::TankOperation`] |
/// | device | [`Change::SystemMode`] | [`ChangeKind::SystemMode`] |
/// | device | [`Change::Feature`] | [`ChangeKind::Feature`] |
/// | device | [`Change::Holiday`] | [`ChangeKind::Holiday`] |
/// | device | [`Change::Preset`] | [`ChangeKind::Preset`] |
///
/// Any other pair is rejected with [`ValidationError::UnsupportedChange`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    /// Absolute target temperature in degrees Celsius.
    TargetTemperature(f64),
    /// Turn on or off.
    Running(bool),
    /// Operating mode.
    SystemMode(SystemMode),
    /// Switch a feature.
    Feature {
        /// The feature.
        feature: Feature,
        /// New state.
        enabled: bool,
    },
    /// Holiday mode, with an optional duration in days (1 to 365).
    Holiday {
        /// New state.
        enabled: bool,
        /// Duration in days.
        days: Option<u16>,
    },
    /// Tank operation.
    TankOperation(TankOperation),
    /// Select one climate preset and clear the others.
    Preset(Preset),
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetTemperature(t) => write!(f, "target temperature {t}"),
            Self::Running(on) => write!(f, "running {on}"),
            Self::SystemMode(mode) => write!(f, "system mode {mode}"),
            Self::Feature { feature, enabled } => write!(f, "{feature} {enabled}"),
            Self::Holiday { enabled, .. } => write!(f, "holiday {enabled}"),
            Self::TankOperation(op) => write!(f, "tank operation {op}"),
            Self::Preset(preset) => write!(f, "preset {preset}"),
        }
    }
}

impl Change {
    /// Returns the change kind for a target, or an error for unsupported
    /// pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedChange`] if the change does not
    /// apply to the target.
    pub fn kind_for(&self, target: Target) -> Result<ChangeKind, ValidationError> {
        match (target, self) {
            (Target::Zone(_), Self::TargetTemperature(_)) => Ok(ChangeKind::ZoneTargetTemperature),
            (Target::Tank, Self::TargetTemperature(_)) => Ok(ChangeKind::TankTargetTemperature),
            (Target::Tank, Self::Running(_)) => Ok(ChangeKind::TankPower),
            (Target::Tank, Self::TankOperation(_)) => Ok(ChangeKind::TankOperation),
            (Target::Device, Self::SystemMode(_)) => Ok(ChangeKind::SystemMode),
            (Target::Device, Self::Feature { feature, .. }) => Ok(ChangeKind::Feature(*feature)),
            (Target::Device, Self::Holiday { .. }) => Ok(ChangeKind::Holiday),
            (Target::Device, Self::Preset(_)) => Ok(ChangeKind::Preset),
            _ => Err(ValidationError::UnsupportedChange {
                target: target.to_string(),
                change: self.to_string(),
            }),
        }
    }

    fn flag(&self) -> Option<bool> {
        match self {
            Self::Running(on) => Some(*on),
            Self::Feature { enabled, .. } | Self::Holiday { enabled, .. } => Some(*enabled),
            _ => None,
        }
    }

    fn value(&self) -> OperationArg {
        match self {
            Self::TargetTemperature(t) => OperationArg::Number(*t),
            Self::SystemMode(mode) => OperationArg::Text(mode.as_str().to_string()),
            Self::TankOperation(op) => OperationArg::Text(op.as_str().to_string()),
            Self::Preset(preset) => OperationArg::Text(preset.as_str().to_string()),
            Self::Running(on) => OperationArg::Flag(*on),
            Self::Feature { enabled, .. } | Self::Holiday { enabled, .. } => {
                OperationArg::Flag(*enabled)
            }
        }
    }

    /// Builds the arguments of a remote operation with the given shape.
    pub(crate) fn arguments(&self, target: Target, shape: ArgShape) -> Vec<OperationArg> {
        match shape {
            ArgShape::ZoneAndValue => match target {
                Target::Zone(zone) => vec![OperationArg::Zone(zone.value()), self.value()],
                Target::Device | Target::Tank => vec![self.value()],
            },
            ArgShape::Value => vec![self.value()],
            ArgShape::Flag => vec![OperationArg::Flag(self.flag().unwrap_or(true))],
            ArgShape::FlagAndDays => {
                let (enabled, days) = match self {
                    Self::Holiday { enabled, days } => (*enabled, if *enabled { *days } else { None }),
                    other => (other.flag().unwrap_or(true), None),
                };
                vec![
                    OperationArg::Flag(enabled),
                    OperationArg::Integer(i64::from(days.unwrap_or(0))),
                ]
            }
            ArgShape::None => Vec::new(),
        }
    }
}
