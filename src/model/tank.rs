// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domestic hot-water tank.

use serde::{Deserialize, Serialize};

/// Hot-water tank state, temperatures in whole degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Measured water temperature.
    pub current_temperature: f64,
    /// Target water temperature.
    pub target_temperature: f64,
    /// Whether the tank heating is enabled.
    pub running: bool,
    /// Target used by the eco operation.
    pub eco_target: f64,
    /// Target used by the comfort operation.
    pub comfort_target: f64,
    /// Anti-legionella cycle enabled.
    pub legionella: bool,
    /// Automatic reheat enabled.
    pub reheat: bool,
}

impl Tank {
    /// Default measured and target temperature.
    pub const DEFAULT_TEMPERATURE: f64 = 60.0;
    /// Default eco preset.
    pub const DEFAULT_ECO_TARGET: f64 = 55.0;
    /// Default comfort preset.
    pub const DEFAULT_COMFORT_TARGET: f64 = 65.0;
}

impl Default for Tank {
    fn default() -> Self {
        Self {
            current_temperature: Self::DEFAULT_TEMPERATURE,
            target_temperature: Self::DEFAULT_TEMPERATURE,
            running: true,
            eco_target: Self::DEFAULT_ECO_TARGET,
            comfort_target: Self::DEFAULT_COMFORT_TARGET,
            legionella: false,
            reheat: true,
        }
    }
}
