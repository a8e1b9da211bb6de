// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating modes, presets and switchable features.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Overall operating mode of a heat pump.
///
/// # Examples
///
/// ```
/// use heatlink::model::SystemMode;
///
/// assert_eq!(SystemMode::from_code(2), Some(SystemMode::Cool));
/// assert_eq!(SystemMode::Heat.code(), 1);
/// assert_eq!(SystemMode::Auto.as_str(), "auto");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemMode {
    /// Heating and cooling disabled.
    Off,
    /// Heating.
    #[default]
    Heat,
    /// Cooling.
    Cool,
    /// Automatic heat/cool selection.
    Auto,
}

impl SystemMode {
    /// Returns the mode for an upstream `operationMode` code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Off),
            1 => Some(Self::Heat),
            2 => Some(Self::Cool),
            3 => Some(Self::Auto),
            _ => None,
        }
    }

    /// Returns the upstream `operationMode` code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Heat => 1,
            Self::Cool => 2,
            Self::Auto => 3,
        }
    }

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Auto => "auto",
        }
    }

    /// Returns `true` unless the mode is [`SystemMode::Off`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown system mode: {other}")),
        }
    }
}

/// Climate preset derived from the device's status flags.
///
/// Presets are mutually exclusive when selected through a command;
/// [`Preset::Normal`] means none of them is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// No special mode active.
    Normal,
    /// Eco mode.
    Eco,
    /// Comfort mode.
    Comfort,
    /// Quiet mode.
    Quiet,
    /// Powerful mode.
    Powerful,
    /// Backup heater forced on.
    ForceHeater,
    /// Holiday mode.
    Holiday,
}

impl Preset {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Eco => "eco",
            Self::Comfort => "comfort",
            Self::Quiet => "quiet",
            Self::Powerful => "powerful",
            Self::ForceHeater => "force_heater",
            Self::Holiday => "holiday",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "eco" => Ok(Self::Eco),
            "comfort" => Ok(Self::Comfort),
            "quiet" => Ok(Self::Quiet),
            "powerful" => Ok(Self::Powerful),
            "force_heater" => Ok(Self::ForceHeater),
            "holiday" => Ok(Self::Holiday),
            other => Err(format!("unknown preset: {other}")),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hot-water tank operation.
///
/// Selecting [`TankOperation::Eco`] or [`TankOperation::Comfort`] also moves
/// the tank target to the matching preset temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankOperation {
    /// No special mode.
    Normal,
    /// Eco target.
    Eco,
    /// Comfort target.
    Comfort,
    /// Immediate hot-water production.
    ForceHotWater,
}

impl TankOperation {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Eco => "eco",
            Self::Comfort => "comfort",
            Self::ForceHotWater => "force_hot_water",
        }
    }
}

impl fmt::Display for TankOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An on/off feature of the device.
///
/// Holiday mode is not listed here because it also carries a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Eco mode.
    Eco,
    /// Comfort mode.
    Comfort,
    /// Quiet mode.
    Quiet,
    /// Powerful mode.
    Powerful,
    /// Force the backup heater.
    ForceHeater,
    /// Force hot-water production.
    ForceHotWater,
    /// Prioritise hot water over space heating.
    DhwPriority,
    /// Weekly schedule.
    Schedule,
    /// Periodic anti-legionella cycle of the tank.
    Legionella,
    /// Automatic tank reheat.
    Reheat,
}

impl Feature {
    /// All features in a stable order.
    pub const ALL: [Self; 10] = [
        Self::Eco,
        Self::Comfort,
        Self::Quiet,
        Self::Powerful,
        Self::ForceHeater,
        Self::ForceHotWater,
        Self::DhwPriority,
        Self::Schedule,
        Self::Legionella,
        Self::Reheat,
    ];

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eco => "eco",
            Self::Comfort => "comfort",
            Self::Quiet => "quiet",
            Self::Powerful => "powerful",
            Self::ForceHeater => "force_heater",
            Self::ForceHotWater => "force_hot_water",
            Self::DhwPriority => "dhw_priority",
            Self::Schedule => "schedule",
            Self::Legionella => "legionella",
            Self::Reheat => "reheat",
        }
    }

    /// Returns `true` for features that only exist on devices with a tank.
    #[must_use]
    pub const fn requires_tank(self) -> bool {
        matches!(
            self,
            Self::ForceHotWater | Self::DhwPriority | Self::Legionella | Self::Reheat
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
