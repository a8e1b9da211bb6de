// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optimistic local mutation.
//!
//! Every change is a plain assignment, so applying it twice yields the same
//! device as applying it once.

use super::{Change, Target};
use crate::model::{Device, Feature, Preset, StatusFlags, TankOperation};

/// Returns a copy of `device` with `change` applied to `target`.
///
/// The change must have passed validation; pairs that do not address an
/// existing part of the device leave it unchanged.
pub(crate) fn mutate(device: &Device, target: Target, change: &Change) -> Device {
    let mut next = device.clone();

    match (target, *change) {
        (Target::Zone(id), Change::TargetTemperature(value)) => {
            if let Some(zone) = next.zone_mut(id) {
                zone.target_temperature = value;
            }
        }
        (Target::Tank, Change::TargetTemperature(value)) => {
            if let Some(tank) = next.tank_mut() {
                tank.target_temperature = value;
            }
        }
        (Target::Tank, Change::Running(on)) => {
            if let Some(tank) = next.tank_mut() {
                tank.running = on;
            }
        }
        (Target::Tank, Change::TankOperation(operation)) => set_tank_operation(&mut next, operation),
        (Target::Device, Change::SystemMode(mode)) => {
            next.set_system_mode(mode);
            for zone in next.zones_mut() {
                zone.running = mode.is_active();
            }
        }
        (Target::Device, Change::Feature { feature, enabled }) => {
            if let Some(flag) = feature_flag(&mut next, feature) {
                *flag = enabled;
            }
        }
        (Target::Device, Change::Preset(preset)) => set_preset(next.flags_mut(), preset),
        (Target::Device, Change::Holiday { enabled, days }) => {
            let flags = next.flags_mut();
            flags.holiday = enabled;
            flags.holiday_days = if enabled {
                days.unwrap_or(flags.holiday_days)
            } else {
                0
            };
        }
        _ => {}
    }

    next
}

fn feature_flag(device: &mut Device, feature: Feature) -> Option<&mut bool> {
    match feature {
        Feature::Eco => Some(&mut device.flags_mut().eco),
        Feature::Comfort => Some(&mut device.flags_mut().comfort),
        Feature::Quiet => Some(&mut device.flags_mut().quiet),
        Feature::Powerful => Some(&mut device.flags_mut().powerful),
        Feature::ForceHeater => Some(&mut device.flags_mut().force_heater),
        Feature::ForceHotWater => Some(&mut device.flags_mut().force_hot_water),
        Feature::DhwPriority => Some(&mut device.flags_mut().dhw_priority),
        Feature::Schedule => Some(&mut device.flags_mut().schedule_enabled),
        Feature::Legionella => device.tank_mut().map(|tank| &mut tank.legionella),
        Feature::Reheat => device.tank_mut().map(|tank| &mut tank.reheat),
    }
}

/// Clears every preset flag, then sets the selected one.
fn set_preset(flags: &mut StatusFlags, preset: Preset) {
    flags.quiet = preset == Preset::Quiet;
    flags.powerful = preset == Preset::Powerful;
    flags.force_heater = preset == Preset::ForceHeater;
    flags.eco = preset == Preset::Eco;
    flags.comfort = preset == Preset::Comfort;
    flags.holiday = preset == Preset::Holiday;
    if !flags.holiday {
        flags.holiday_days = 0;
    }
}

fn set_tank_operation(device: &mut Device, operation: TankOperation) {
    let flags = device.flags_mut();
    flags.eco = operation == TankOperation::Eco;
    flags.comfort = operation == TankOperation::Comfort;
    flags.force_hot_water = operation == TankOperation::ForceHotWater;

    if let Some(tank) = device.tank_mut() {
        match operation {
            TankOperation::Eco => tank.target_temperature = tank.eco_target,
            TankOperation::Comfort => tank.target_temperature = tank.comfort_target,
            TankOperation::Normal | TankOperation::ForceHotWater => {}
        }
    }
}
