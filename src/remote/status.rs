// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw status payloads as returned by the remote service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::SystemMode;

/// A device status payload before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawStatus {
    /// Named fields in canonical units.
    Structured(Box<StructuredStatus>),
    /// Loosely-typed JSON document with camelCase keys and upstream units.
    ///
    /// The document may be nested under a top-level `"status"` key.
    Document(Value),
}

impl From<StructuredStatus> for RawStatus {
    fn from(status: StructuredStatus) -> Self {
        Self::Structured(Box::new(status))
    }
}

impl From<Value> for RawStatus {
    fn from(document: Value) -> Self {
        Self::Document(document)
    }
}

/// Status with named fields, temperatures in degrees Celsius and absolute
/// zone targets.
///
/// Every field is optional. Fields left unset fall back to the `extra`
/// document, then to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredStatus {
    /// Device id the payload belongs to.
    pub id: Option<String>,
    /// Device name.
    pub name: Option<String>,
    /// Operating mode.
    pub system_mode: Option<SystemMode>,
    /// Quiet mode.
    pub quiet: Option<bool>,
    /// Powerful mode.
    pub powerful: Option<bool>,
    /// Eco mode.
    pub eco: Option<bool>,
    /// Comfort mode.
    pub comfort: Option<bool>,
    /// Holiday mode.
    pub holiday: Option<bool>,
    /// Holiday duration in days.
    pub holiday_days: Option<u16>,
    /// Backup heater forced on.
    pub force_heater: Option<bool>,
    /// Hot water forced on.
    pub force_hot_water: Option<bool>,
    /// Hot-water priority.
    pub dhw_priority: Option<bool>,
    /// Weekly schedule.
    pub schedule_enabled: Option<bool>,
    /// Defrost running.
    pub defrost: Option<bool>,
    /// External heater running.
    pub external_heater: Option<bool>,
    /// Outdoor temperature.
    pub outdoor_temperature: Option<f64>,
    /// Water pressure in bar.
    pub water_pressure: Option<f64>,
    /// Pump duty level.
    pub pump_duty: Option<u32>,
    /// Zones.
    pub zones: Option<Vec<StructuredZone>>,
    /// Hot-water tank.
    pub tank: Option<StructuredTank>,
    /// Untyped document consulted for fields not set above.
    pub extra: Option<Value>,
}

/// Zone status with named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredZone {
    /// Zone number, starting at 1.
    pub id: u8,
    /// Zone name.
    pub name: Option<String>,
    /// Measured temperature.
    pub current_temperature: Option<f64>,
    /// Absolute target temperature.
    pub target_temperature: Option<f64>,
    /// Zone running.
    pub running: Option<bool>,
    /// Eco offset.
    pub eco_offset: Option<f64>,
    /// Comfort offset.
    pub comfort_offset: Option<f64>,
}

/// Tank status with named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredTank {
    /// Measured temperature.
    pub current_temperature: Option<f64>,
    /// Target temperature.
    pub target_temperature: Option<f64>,
    /// Tank heating enabled.
    pub running: Option<bool>,
    /// Eco preset.
    pub eco_target: Option<f64>,
    /// Comfort preset.
    pub comfort_target: Option<f64>,
    /// Anti-legionella cycle.
    pub legionella: Option<bool>,
    /// Automatic reheat.
    pub reheat: Option<bool>,
}
