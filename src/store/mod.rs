// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Concurrent device state store.
//!
//! A sharded map from device id to [`DeviceSlot`]. There is no global lock:
//! readers load snapshots lock-free and writers only serialize per device.

mod slot;

pub(crate) use slot::{DeviceGuard, DeviceSlot};

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::Snapshot;
use crate::remote::DeviceInfo;

/// Map of device slots keyed by device id.
#[derive(Debug, Default)]
pub(crate) struct StateStore {
    slots: DashMap<String, Arc<DeviceSlot>>,
}

impl StateStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the slot of a device.
    ///
    /// The map guard is released before returning, so the slot can be held
    /// across awaits.
    pub(crate) fn slot(&self, device_id: &str) -> Option<Arc<DeviceSlot>> {
        self.slots.get(device_id).map(|r| Arc::clone(r.value()))
    }

    /// Returns the slot for an enumerated device, creating it if needed,
    /// and records the latest device info.
    pub(crate) fn upsert(&self, info: DeviceInfo) -> Arc<DeviceSlot> {
        if let Some(slot) = self.slot(&info.id) {
            slot.set_info(info);
            return slot;
        }
        let slot = self
            .slots
            .entry(info.id.clone())
            .or_insert_with(|| Arc::new(DeviceSlot::new(info.clone())));
        let slot = Arc::clone(slot.value());
        slot.set_info(info);
        slot
    }

    /// Removes a device. Returns `true` if it was present.
    pub(crate) fn remove(&self, device_id: &str) -> bool {
        self.slots.remove(device_id).is_some()
    }

    /// Returns the current snapshot of a device.
    pub(crate) fn get(&self, device_id: &str) -> Option<Arc<Snapshot>> {
        self.slot(device_id)?.snapshot()
    }

    /// Returns every published snapshot, ordered by device id.
    pub(crate) fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        let mut snapshots: Vec<_> = self
            .slots
            .iter()
            .filter_map(|r| r.value().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.device_id().cmp(b.device_id()));
        snapshots
    }

    /// Returns the ids of devices that have a snapshot, sorted.
    pub(crate) fn device_ids(&self) -> Vec<String> {
        self.snapshots()
            .iter()
            .map(|s| s.device_id().to_string())
            .collect()
    }

    /// Returns every known device id, with or without a snapshot.
    pub(crate) fn known_ids(&self) -> Vec<String> {
        self.slots.iter().map(|r| r.key().clone()).collect()
    }
}
