// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for engine notifications.
//!
//! The [`EventBus`] uses tokio's broadcast channel so that any number of
//! consumers can follow snapshot updates, staleness, evictions and command
//! outcomes. Obtain a receiver with [`Engine::subscribe`](crate::Engine::subscribe).
//!
//! # Examples
//!
//! ```
//! use heatlink::event::{EngineEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(EngineEvent::DeviceEvicted { device_id: "hp-1".to_string() });
//! ```

mod command_id;
mod engine_event;
mod event_bus;

pub use command_id::CommandId;
pub use engine_event::{EngineEvent, UpdateSource};
pub use event_bus::EventBus;
