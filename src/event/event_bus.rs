// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting engine events.

use tokio::sync::broadcast;

use super::EngineEvent;

/// Number of events buffered per subscriber unless configured otherwise.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`EngineEvent`]s to any number of consumers.
///
/// Each subscriber receives its own copy of every event published after it
/// subscribed. Publishing never blocks the engine.
///
/// # Capacity
///
/// The channel buffers a fixed number of events (default 256, see
/// [`EngineConfig::with_event_capacity`](crate::EngineConfig::with_event_capacity)).
/// A subscriber that falls further behind loses the oldest events and
/// gets `RecvError::Lagged`. Snapshots can always be re-read from the
/// engine, so a lagged consumer only needs to refresh.
///
/// # Examples
///
/// ```
/// use heatlink::event::{EngineEvent, EventBus};
///
/// let bus = EventBus::with_capacity(16);
/// let mut rx = bus.subscribe();
///
/// bus.publish(EngineEvent::EnumerationFailed {
///     reason: "gateway unreachable".to_string(),
/// });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Creates a bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; [`EngineConfig::validate`](crate::EngineConfig::validate)
    /// rejects that value.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Sends an event to every receiver. Without receivers the event is
    /// dropped.
    pub fn publish(&self, event: EngineEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(?event, "No subscribers for engine event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
