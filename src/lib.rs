// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heatlink - keep heat pump state in sync with a remote control service.
//!
//! The engine polls a remote device-control service, normalizes whatever it
//! returns into one stable model, and dispatches commands that take effect
//! locally right away while the remote side catches up.
//!
//! # Features
//!
//! - **Polling**: fixed-interval refresh with a bounded worker pool,
//!   per-device failure isolation and eviction of vanished devices
//! - **Normalization**: structured objects or loose JSON documents, with
//!   documented defaults for every missing field
//! - **Optimistic commands**: immediate local mutation, then remote
//!   invocation through a learned ranking of candidate operations
//! - **Events**: a broadcast stream to refresh consumers
//!
//! # Quick Start
//!
//! ```no_run
//! use heatlink::{Change, Engine, EngineConfig, HttpRemoteConfig, Target};
//! use heatlink::model::SystemMode;
//!
//! #[tokio::main]
//! async fn main() -> heatlink::Result<()> {
//!     let client = HttpRemoteConfig::new("http://gateway.local")
//!         .with_token("secret")
//!         .into_client()?;
//!     let engine = Engine::new(client, EngineConfig::default())?;
//!
//!     let report = engine.poll_once().await?;
//!     println!("{} devices updated", report.succeeded.len());
//!
//!     for snapshot in engine.snapshots() {
//!         let device = snapshot.device();
//!         println!("{}: {}", device.display_name(), device.system_mode());
//!     }
//!
//!     if let Some(id) = engine.device_ids().first() {
//!         match engine
//!             .apply(id, Target::Device, Change::SystemMode(SystemMode::Auto))
//!             .await
//!         {
//!             Ok(_) => println!("mode changed"),
//!             Err(e) if e.applied_snapshot().is_some() => {
//!                 println!("changed locally, remote side unreachable: {e}");
//!             }
//!             Err(e) => return Err(e),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Events
//!
//! ```no_run
//! # async fn run<C: heatlink::remote::RemoteClient>(engine: heatlink::Engine<C>) {
//! use heatlink::event::EngineEvent;
//!
//! let mut events = engine.subscribe();
//! let poller = engine.start();
//!
//! while let Ok(event) = events.recv().await {
//!     if let EngineEvent::SnapshotUpdated { device_id, source, .. } = &event {
//!         println!("{device_id} refreshed by {source}");
//!     }
//! }
//! poller.shutdown().await;
//! # }
//! ```
//!
//! # Custom remote services
//!
//! Implement [`remote::RemoteClient`] to talk to anything other than the
//! bundled HTTP gateway client. Disable default features to drop the HTTP
//! stack entirely.

pub mod adapter;
pub mod capability;
mod config;
mod dispatcher;
mod engine;
pub mod error;
pub mod event;
pub mod model;
mod poller;
pub mod remote;
mod store;

pub use capability::{CapabilityRegistry, ChangeKind, OperationDescriptor};
pub use config::EngineConfig;
pub use dispatcher::{Change, Target};
pub use engine::Engine;
pub use error::{AdapterError, ConfigError, Error, RemoteError, Result, ValidationError};
pub use event::{CommandId, EngineEvent, EventBus, UpdateSource};
pub use poller::{PollReport, PollerHandle};
#[cfg(feature = "http")]
pub use remote::{HttpRemoteClient, HttpRemoteConfig};
pub use remote::{DeviceInfo, RawStatus, RemoteClient, ZoneInfo};
