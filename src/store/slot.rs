// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device storage slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arc_swap::ArcSwapOption;
use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::Snapshot;
use crate::remote::DeviceInfo;

/// Everything the engine keeps about one device.
///
/// The snapshot is read without locking. Writers (poll fetch, command,
/// confirmation fetch) hold the device lock while they replace it, so at
/// most one of them runs per device.
#[derive(Debug)]
pub(crate) struct DeviceSlot {
    snapshot: ArcSwapOption<Snapshot>,
    lock: Arc<Mutex<()>>,
    info: RwLock<DeviceInfo>,
    absent_cycles: AtomicU32,
    skipped_polls: AtomicU32,
}

/// Proof that the holder owns the device lock.
pub(crate) type DeviceGuard = OwnedMutexGuard<()>;

impl DeviceSlot {
    pub(crate) fn new(info: DeviceInfo) -> Self {
        Self {
            snapshot: ArcSwapOption::empty(),
            lock: Arc::new(Mutex::new(())),
            info: RwLock::new(info),
            absent_cycles: AtomicU32::new(0),
            skipped_polls: AtomicU32::new(0),
        }
    }

    /// Returns the current snapshot.
    pub(crate) fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.load_full()
    }

    /// Replaces the snapshot. The caller must hold the device lock.
    pub(crate) fn publish(&self, _guard: &DeviceGuard, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot.store(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Waits for the device lock.
    pub(crate) async fn lock(&self) -> DeviceGuard {
        Arc::clone(&self.lock).lock_owned().await
    }

    /// Takes the device lock if it is free.
    pub(crate) fn try_lock(&self) -> Option<DeviceGuard> {
        Arc::clone(&self.lock).try_lock_owned().ok()
    }

    /// Returns the latest device info from enumeration.
    pub(crate) fn info(&self) -> DeviceInfo {
        self.info.read().clone()
    }

    pub(crate) fn set_info(&self, info: DeviceInfo) {
        *self.info.write() = info;
    }

    /// Resets the absence counter.
    pub(crate) fn mark_present(&self) {
        self.absent_cycles.store(0, Ordering::Relaxed);
    }

    /// Counts one more cycle of absence and returns the total.
    pub(crate) fn mark_absent(&self) -> u32 {
        self.absent_cycles.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Counts one more skipped poll and returns the consecutive total.
    pub(crate) fn record_skip(&self) -> u32 {
        self.skipped_polls.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn reset_skips(&self) {
        self.skipped_polls.store(0, Ordering::Relaxed);
    }
}
