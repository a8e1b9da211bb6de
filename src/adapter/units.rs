// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit conversion for untyped status documents.
//!
//! Zone temperatures arrive as integers in tenths of a degree and the zone
//! `heatSet` value is an offset from the measured temperature. Tank
//! temperatures arrive in whole degrees and are absolute. Every conversion
//! of document values to degrees Celsius goes through [`Conversion::apply`]
//! using the tables below.

/// Scale of a raw document temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Tenths of a degree.
    Tenths,
    /// Whole degrees.
    Whole,
}

impl Scale {
    /// Converts a raw value to degrees.
    #[must_use]
    pub fn to_celsius(self, raw: f64) -> f64 {
        match self {
            Self::Tenths => raw / 10.0,
            Self::Whole => raw,
        }
    }
}

/// How a raw temperature maps to its canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// The value is an absolute temperature.
    Absolute(Scale),
    /// The value is an offset added to the field's paired measured
    /// temperature.
    RelativeToCurrent(Scale),
}

impl Conversion {
    /// Converts a raw value, given the already converted measured
    /// temperature for relative fields.
    #[must_use]
    pub fn apply(self, raw: f64, current: f64) -> f64 {
        match self {
            Self::Absolute(scale) => scale.to_celsius(raw),
            Self::RelativeToCurrent(scale) => current + scale.to_celsius(raw),
        }
    }
}

/// A temperature field of a document object.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureField {
    /// Accepted keys, first match wins.
    pub keys: &'static [&'static str],
    /// Conversion to canonical units.
    pub conversion: Conversion,
}

/// Zone measured temperature.
pub const ZONE_CURRENT: TemperatureField = TemperatureField {
    keys: &["temperatureNow"],
    conversion: Conversion::Absolute(Scale::Tenths),
};

/// Zone target, an offset from the measured temperature.
pub const ZONE_TARGET: TemperatureField = TemperatureField {
    keys: &["heatSet"],
    conversion: Conversion::RelativeToCurrent(Scale::Tenths),
};

/// Zone eco offset.
pub const ZONE_ECO_OFFSET: TemperatureField = TemperatureField {
    keys: &["ecoOffset", "ecoHeat"],
    conversion: Conversion::Absolute(Scale::Tenths),
};

/// Zone comfort offset.
pub const ZONE_COMFORT_OFFSET: TemperatureField = TemperatureField {
    keys: &["comfortOffset", "comfortHeat"],
    conversion: Conversion::Absolute(Scale::Tenths),
};

/// Tank measured temperature.
pub const TANK_CURRENT: TemperatureField = TemperatureField {
    keys: &["temperatureNow"],
    conversion: Conversion::Absolute(Scale::Whole),
};

/// Tank target temperature.
pub const TANK_TARGET: TemperatureField = TemperatureField {
    keys: &["heatSet"],
    conversion: Conversion::Absolute(Scale::Whole),
};

/// Tank eco preset.
pub const TANK_ECO: TemperatureField = TemperatureField {
    keys: &["ecoTemp"],
    conversion: Conversion::Absolute(Scale::Whole),
};

/// Tank comfort preset.
pub const TANK_COMFORT: TemperatureField = TemperatureField {
    keys: &["comfortTemp"],
    conversion: Conversion::Absolute(Scale::Whole),
};

/// Outdoor temperature.
pub const OUTDOOR: TemperatureField = TemperatureField {
    keys: &["outdoorNow"],
    conversion: Conversion::Absolute(Scale::Whole),
};

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zone_values_are_tenths() {
        let current = ZONE_CURRENT.conversion.apply(56.0, 0.0);
        assert!(close(current, 5.6));
        assert!(close(ZONE_TARGET.conversion.apply(5.0, current), 6.1));
    }

    #[test]
    fn negative_offsets() {
        assert!(close(ZONE_ECO_OFFSET.conversion.apply(-20.0, 0.0), -2.0));
        assert!(close(ZONE_TARGET.conversion.apply(-15.0, 21.0), 19.5));
    }

    #[test]
    fn tank_values_are_whole_degrees() {
        assert!(close(TANK_TARGET.conversion.apply(60.0, 0.0), 60.0));
        assert!(close(TANK_CURRENT.conversion.apply(59.0, 12.0), 59.0));
    }
}
