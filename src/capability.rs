// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote operation discovery.
//!
//! The remote service does not advertise which control operations a device
//! accepts, and the set differs between hardware classes and firmware. The
//! [`CapabilityRegistry`] holds a seeded catalog of candidate operations for
//! each [`ChangeKind`] and learns, per [`DeviceClass`], which ones work.
//!
//! # Ranking
//!
//! Candidates keep their catalog order within each tier:
//!
//! 1. operations that succeeded and never failed;
//! 2. untested operations;
//! 3. operations that failed but succeeded since;
//! 4. operations whose last outcome was a failure.
//!
//! Operations are never removed, so a transient failure cannot hide one
//! permanently.
//!
//! # Examples
//!
//! ```
//! use heatlink::capability::{CapabilityRegistry, ChangeKind};
//! use heatlink::model::DeviceClass;
//!
//! let registry = CapabilityRegistry::new();
//! let class = DeviceClass::default();
//!
//! let first = registry.ranked_candidates(&class, ChangeKind::SystemMode);
//! assert_eq!(first[0].name(), "set_operation_mode");
//!
//! registry.record_outcome(&class, &first[0], false);
//! let ranked = registry.ranked_candidates(&class, ChangeKind::SystemMode);
//! assert_eq!(ranked.last().unwrap().name(), "set_operation_mode");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use crate::model::{DeviceClass, Feature};

/// Category of a state change, used to select candidate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Absolute zone target temperature.
    ZoneTargetTemperature,
    /// Tank target temperature.
    TankTargetTemperature,
    /// Tank heating on/off.
    TankPower,
    /// Device operating mode.
    SystemMode,
    /// A switchable feature.
    Feature(Feature),
    /// Holiday mode with optional duration.
    Holiday,
    /// Tank operation (normal, eco, comfort, forced).
    TankOperation,
    /// Exclusive climate preset.
    Preset,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoneTargetTemperature => f.write_str("zone target temperature"),
            Self::TankTargetTemperature => f.write_str("tank target temperature"),
            Self::TankPower => f.write_str("tank power"),
            Self::SystemMode => f.write_str("system mode"),
            Self::Feature(feature) => write!(f, "{feature} feature"),
            Self::Holiday => f.write_str("holiday mode"),
            Self::TankOperation => f.write_str("tank operation"),
            Self::Preset => f.write_str("preset"),
        }
    }
}

/// How a change is turned into operation arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgShape {
    /// Zone number followed by the value.
    ZoneAndValue,
    /// The value alone.
    Value,
    /// A single on/off flag.
    Flag,
    /// An on/off flag followed by a day count.
    FlagAndDays,
    /// No arguments.
    None,
}

/// A candidate remote operation for one kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperationDescriptor {
    kind: ChangeKind,
    name: &'static str,
    shape: ArgShape,
}

impl OperationDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(kind: ChangeKind, name: &'static str, shape: ArgShape) -> Self {
        Self { kind, name, shape }
    }

    /// Returns the change kind this operation applies.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Returns the remote operation name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the argument shape.
    #[must_use]
    pub const fn shape(&self) -> ArgShape {
        self.shape
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = match self.shape {
            ArgShape::ZoneAndValue => "zone, value",
            ArgShape::Value => "value",
            ArgShape::Flag => "flag",
            ArgShape::FlagAndDays => "flag, days",
            ArgShape::None => "",
        };
        write!(f, "{}({args})", self.name)
    }
}

const ZONE_TARGET: &[(&str, ArgShape)] = &[
    ("set_zone_temperature", ArgShape::ZoneAndValue),
    ("set_heating_temperature", ArgShape::ZoneAndValue),
    ("set_target_temperature", ArgShape::ZoneAndValue),
    ("set_target_temperature", ArgShape::Value),
];

const TANK_TARGET: &[(&str, ArgShape)] = &[
    ("set_tank_temperature", ArgShape::Value),
    ("set_dhw_temperature", ArgShape::Value),
    ("set_water_temperature", ArgShape::Value),
    ("set_target_temperature", ArgShape::Value),
    ("tank_set_temperature", ArgShape::Value),
    ("dhw_set_temperature", ArgShape::Value),
];

const TANK_POWER: &[(&str, ArgShape)] = &[
    ("set_tank_operation", ArgShape::Flag),
    ("set_tank_enabled", ArgShape::Flag),
    ("set_dhw_operation", ArgShape::Flag),
];

const SYSTEM_MODE: &[(&str, ArgShape)] = &[
    ("set_operation_mode", ArgShape::Value),
    ("set_hvac_mode", ArgShape::Value),
    ("set_mode", ArgShape::Value),
];

const HOLIDAY: &[(&str, ArgShape)] = &[
    ("set_holiday_mode", ArgShape::FlagAndDays),
    ("set_holiday_mode", ArgShape::Flag),
];

const TANK_OPERATION: &[(&str, ArgShape)] = &[
    ("set_tank_operation_mode", ArgShape::Value),
    ("set_dhw_mode", ArgShape::Value),
];

const PRESET: &[(&str, ArgShape)] = &[("set_preset_mode", ArgShape::Value)];

fn feature_operations(feature: Feature) -> &'static [(&'static str, ArgShape)] {
    match feature {
        Feature::Eco => &[("set_eco_mode", ArgShape::Flag)],
        Feature::Comfort => &[("set_comfort_mode", ArgShape::Flag)],
        Feature::Quiet => &[("set_quiet_mode", ArgShape::Flag)],
        Feature::Powerful => &[("set_powerful_mode", ArgShape::Flag)],
        Feature::ForceHeater => &[("set_force_heater", ArgShape::Flag)],
        Feature::ForceHotWater => &[("set_force_dhw", ArgShape::Flag)],
        Feature::DhwPriority => &[("set_dhw_priority", ArgShape::Flag)],
        Feature::Schedule => &[
            ("set_schedule_enabled", ArgShape::Flag),
            ("set_schedule", ArgShape::Flag),
        ],
        Feature::Legionella => &[("set_legionella_mode", ArgShape::Flag)],
        Feature::Reheat => &[("set_reheat_mode", ArgShape::Flag)],
    }
}

/// Returns the seeded candidate operations for a change kind, in catalog
/// order.
#[must_use]
pub fn catalog(kind: ChangeKind) -> Vec<OperationDescriptor> {
    let entries = match kind {
        ChangeKind::ZoneTargetTemperature => ZONE_TARGET,
        ChangeKind::TankTargetTemperature => TANK_TARGET,
        ChangeKind::TankPower => TANK_POWER,
        ChangeKind::SystemMode => SYSTEM_MODE,
        ChangeKind::Feature(feature) => feature_operations(feature),
        ChangeKind::Holiday => HOLIDAY,
        ChangeKind::TankOperation => TANK_OPERATION,
        ChangeKind::Preset => PRESET,
    };
    entries
        .iter()
        .map(|&(name, shape)| OperationDescriptor::new(kind, name, shape))
        .collect()
}

/// Success and failure counts of one operation for one device class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    /// Number of successful invocations.
    pub successes: u64,
    /// Number of failed invocations.
    pub failures: u64,
    #[serde(skip)]
    last_success: Option<u64>,
    #[serde(skip)]
    last_failure: Option<u64>,
}

impl OutcomeTally {
    /// Returns `true` if the operation has failed at least once but its
    /// most recent outcome was a success.
    #[must_use]
    pub fn recovered(&self) -> bool {
        match (self.last_success, self.last_failure) {
            (Some(success), Some(failure)) => success > failure,
            _ => false,
        }
    }

    fn tier(&self) -> u8 {
        match (self.successes, self.failures) {
            (0, 0) => 1,
            (_, 0) => 0,
            _ if self.recovered() => 2,
            _ => 3,
        }
    }
}

type TallyKey = (DeviceClass, OperationDescriptor);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ranking {
    Learned,
    Fixed,
}

/// Seeded catalog plus learned outcomes, shared by all devices.
///
/// Thread-safe; outcomes recorded concurrently for the same class are all
/// counted.
#[derive(Debug)]
pub struct CapabilityRegistry {
    ranking: Ranking,
    tallies: RwLock<HashMap<TallyKey, OutcomeTally>>,
    sequence: AtomicU64,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// Creates a registry that ranks candidates by recorded outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ranking(Ranking::Learned)
    }

    /// Creates a registry that always returns the full catalog in seed
    /// order. Outcomes are still recorded.
    #[must_use]
    pub fn unranked() -> Self {
        Self::with_ranking(Ranking::Fixed)
    }

    fn with_ranking(ranking: Ranking) -> Self {
        Self {
            ranking,
            tallies: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns `true` if candidates are ranked by outcome.
    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.ranking == Ranking::Learned
    }

    /// Returns the candidate operations for a change, best first.
    #[must_use]
    pub fn ranked_candidates(
        &self,
        class: &DeviceClass,
        kind: ChangeKind,
    ) -> Vec<OperationDescriptor> {
        let mut candidates = catalog(kind);
        if self.ranking == Ranking::Fixed {
            return candidates;
        }

        let tallies = self.tallies.read();
        // Stable sort keeps catalog order within a tier.
        candidates.sort_by_key(|op| {
            tallies
                .get(&(class.clone(), *op))
                .map_or(1, OutcomeTally::tier)
        });
        candidates
    }

    /// Records the outcome of invoking `operation` on a device of `class`.
    pub fn record_outcome(&self, class: &DeviceClass, operation: &OperationDescriptor, success: bool) {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut tallies = self.tallies.write();
        let tally = tallies.entry((class.clone(), *operation)).or_default();
        if success {
            tally.successes += 1;
            tally.last_success = Some(seq);
        } else {
            tally.failures += 1;
            tally.last_failure = Some(seq);
        }
    }

    /// Returns the tally of one operation for a class.
    #[must_use]
    pub fn tally(&self, class: &DeviceClass, operation: &OperationDescriptor) -> OutcomeTally {
        self.tallies
            .read()
            .get(&(class.clone(), *operation))
            .copied()
            .unwrap_or_default()
    }

    /// Returns every recorded tally, for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(DeviceClass, OperationDescriptor, OutcomeTally)> {
        let mut entries: Vec<_> = self
            .tallies
            .read()
            .iter()
            .map(|((class, op), tally)| (class.clone(), *op, *tally))
            .collect();
        entries.sort_by(|a, b| (&a.0, a.1.name).cmp(&(&b.0, b.1.name)));
        entries
    }
}
