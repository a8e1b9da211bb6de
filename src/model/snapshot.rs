// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timestamped device snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::device::Device;

/// An immutable, timestamped copy of a [`Device`] as held by the store.
///
/// Snapshots are never edited in place. Every poll, command and
/// confirmation produces a new one that replaces the previous value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    device: Device,
    fetched_at: DateTime<Utc>,
    stale: bool,
    pending_remote_confirmation: bool,
    modified_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Creates a snapshot from freshly fetched upstream data.
    #[must_use]
    pub fn fetched(device: Device, fetched_at: DateTime<Utc>) -> Self {
        Self {
            device,
            fetched_at,
            stale: false,
            pending_remote_confirmation: false,
            modified_at: None,
        }
    }

    /// Returns the device state.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Returns the device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        self.device.id()
    }

    /// Returns when the data was last fetched from upstream.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Returns `true` if the most recent poll for this device failed and
    /// the data is carried over from an earlier cycle.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Returns `true` if a local change could not be sent to the device.
    #[must_use]
    pub fn is_pending_remote_confirmation(&self) -> bool {
        self.pending_remote_confirmation
    }

    /// Returns when a command last changed this snapshot locally.
    #[must_use]
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// Returns a copy flagged as stale.
    #[must_use]
    pub(crate) fn marked_stale(&self) -> Self {
        Self {
            stale: true,
            ..self.clone()
        }
    }

    /// Returns a copy carrying a locally modified device.
    #[must_use]
    pub(crate) fn modified(&self, device: Device, at: DateTime<Utc>) -> Self {
        Self {
            device,
            fetched_at: self.fetched_at,
            stale: false,
            pending_remote_confirmation: self.pending_remote_confirmation,
            modified_at: Some(at),
        }
    }

    /// Returns a copy with the pending-confirmation flag set to `pending`.
    #[must_use]
    pub(crate) fn with_pending_confirmation(&self, pending: bool) -> Self {
        Self {
            pending_remote_confirmation: pending,
            ..self.clone()
        }
    }
}
