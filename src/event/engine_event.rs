// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine event types.

use std::fmt;
use std::sync::Arc;

use super::CommandId;
use crate::capability::ChangeKind;
use crate::model::Snapshot;

/// What produced a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateSource {
    /// A regular poll cycle.
    Poll,
    /// An optimistic local change from a command.
    Command,
    /// The fetch that follows a successful remote command.
    Confirmation,
}

impl fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Poll => "poll",
            Self::Command => "command",
            Self::Confirmation => "confirmation",
        })
    }
}

/// Events published by the engine.
///
/// Consumers use these as a refresh hook: any event naming a device means
/// its snapshot may have changed.
///
/// # Examples
///
/// ```
/// use heatlink::event::EngineEvent;
///
/// let event = EngineEvent::DeviceEvicted { device_id: "hp-1".to_string() };
/// assert_eq!(event.device_id(), Some("hp-1"));
/// assert!(!event.is_command());
/// ```
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A device snapshot was replaced.
    SnapshotUpdated {
        /// The device.
        device_id: String,
        /// What produced the snapshot.
        source: UpdateSource,
        /// The new snapshot.
        snapshot: Arc<Snapshot>,
    },

    /// A poll for the device failed and its previous snapshot is now stale.
    DeviceStale {
        /// The device.
        device_id: String,
        /// Why the fetch failed.
        reason: String,
    },

    /// The device was absent from enumeration too long and was removed.
    DeviceEvicted {
        /// The device.
        device_id: String,
    },

    /// Listing devices failed; the store was left untouched.
    EnumerationFailed {
        /// Why listing failed.
        reason: String,
    },

    /// The device was busy on several consecutive polls.
    PollSkipped {
        /// The device.
        device_id: String,
        /// Consecutive skipped polls.
        consecutive: u32,
    },

    /// The remote service accepted a command.
    CommandAccepted {
        /// The command.
        command_id: CommandId,
        /// The device.
        device_id: String,
        /// The kind of change.
        kind: ChangeKind,
        /// The remote operation that succeeded.
        operation: &'static str,
    },

    /// The confirmation fetch after a command refreshed the snapshot.
    CommandConfirmed {
        /// The command.
        command_id: CommandId,
        /// The device.
        device_id: String,
    },

    /// No remote operation accepted a command; the change is local only.
    CommandUnconfirmed {
        /// The command.
        command_id: CommandId,
        /// The device.
        device_id: String,
        /// Number of remote operations tried.
        attempts: usize,
    },
}

impl EngineEvent {
    /// Returns the device this event is about, if any.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::SnapshotUpdated { device_id, .. }
            | Self::DeviceStale { device_id, .. }
            | Self::DeviceEvicted { device_id }
            | Self::PollSkipped { device_id, .. }
            | Self::CommandAccepted { device_id, .. }
            | Self::CommandConfirmed { device_id, .. }
            | Self::CommandUnconfirmed { device_id, .. } => Some(device_id),
            Self::EnumerationFailed { .. } => None,
        }
    }

    /// Returns the command this event is about, if any.
    #[must_use]
    pub fn command_id(&self) -> Option<CommandId> {
        match self {
            Self::CommandAccepted { command_id, .. }
            | Self::CommandConfirmed { command_id, .. }
            | Self::CommandUnconfirmed { command_id, .. } => Some(*command_id),
            _ => None,
        }
    }

    /// Returns `true` if this event carries a new snapshot.
    #[must_use]
    pub fn is_snapshot_update(&self) -> bool {
        matches!(self, Self::SnapshotUpdated { .. })
    }

    /// Returns `true` if this is a command outcome event.
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.command_id().is_some()
    }

    /// Creates a snapshot update event.
    #[must_use]
    pub fn snapshot_updated(source: UpdateSource, snapshot: Arc<Snapshot>) -> Self {
        Self::SnapshotUpdated {
            device_id: snapshot.device_id().to_string(),
            source,
            snapshot,
        }
    }
}
