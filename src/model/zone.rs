// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heating zones.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a zone within a device (1-based).
///
/// # Examples
///
/// ```
/// use heatlink::model::ZoneId;
///
/// let zone = ZoneId::new(2).unwrap();
/// assert_eq!(zone.value(), 2);
/// assert!(ZoneId::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ZoneId(u8);

impl ZoneId {
    /// The first zone.
    pub const FIRST: Self = Self(1);

    /// Creates a zone id, returning `None` for 0.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ZoneId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "zone id must be at least 1".to_string())
    }
}

impl From<ZoneId> for u8 {
    fn from(id: ZoneId) -> Self {
        id.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A heating zone, with temperatures in degrees Celsius.
///
/// `target_temperature` is always absolute, whatever encoding upstream used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone identifier, unique within its device.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
    /// Measured temperature.
    pub current_temperature: f64,
    /// Absolute target temperature.
    pub target_temperature: f64,
    /// Whether the zone is currently operating.
    pub running: bool,
    /// Offset applied in eco mode.
    pub eco_offset: f64,
    /// Offset applied in comfort mode.
    pub comfort_offset: f64,
}

impl Zone {
    /// Default measured temperature.
    pub const DEFAULT_CURRENT_TEMPERATURE: f64 = 20.0;
    /// Default distance between target and measured temperature.
    pub const DEFAULT_TARGET_OFFSET: f64 = 2.0;
    /// Default eco offset.
    pub const DEFAULT_ECO_OFFSET: f64 = -2.0;
    /// Default comfort offset.
    pub const DEFAULT_COMFORT_OFFSET: f64 = 1.0;

    /// Creates a zone with every field at its documented default.
    #[must_use]
    pub fn with_defaults(id: ZoneId) -> Self {
        Self {
            id,
            name: Self::default_name(id),
            current_temperature: Self::DEFAULT_CURRENT_TEMPERATURE,
            target_temperature: Self::DEFAULT_CURRENT_TEMPERATURE + Self::DEFAULT_TARGET_OFFSET,
            running: true,
            eco_offset: Self::DEFAULT_ECO_OFFSET,
            comfort_offset: Self::DEFAULT_COMFORT_OFFSET,
        }
    }

    /// Returns the fallback name for a zone.
    #[must_use]
    pub fn default_name(id: ZoneId) -> String {
        format!("Zone {id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_zone() {
        assert!(ZoneId::new(0).is_none());
        assert!(ZoneId::try_from(0).is_err());
    }

    #[test]
    fn defaults() {
        let zone = Zone::with_defaults(ZoneId::FIRST);
        assert_eq!(zone.name, "Zone 1");
        assert!((zone.current_temperature - 20.0).abs() < f64::EPSILON);
        assert!((zone.target_temperature - 22.0).abs() < f64::EPSILON);
        assert!(zone.running);
    }

    #[test]
    fn zone_id_serializes_as_number() {
        let json = serde_json::to_string(&ZoneId::new(3).unwrap()).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<ZoneId>("0").is_err());
    }
}
