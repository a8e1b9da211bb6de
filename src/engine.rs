// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine facade.

use std::sync::Arc;

use tokio::sync::{Semaphore, broadcast};

use crate::capability::CapabilityRegistry;
use crate::config::EngineConfig;
use crate::dispatcher::{self, Change, Target};
use crate::error::Result;
use crate::event::{EngineEvent, EventBus};
use crate::model::Snapshot;
use crate::poller::{self, PollReport, PollerHandle};
use crate::remote::RemoteClient;
use crate::store::StateStore;

/// State shared by the engine, the poll loop and command tasks.
pub(crate) struct Shared<C> {
    pub(crate) client: C,
    pub(crate) store: StateStore,
    pub(crate) registry: CapabilityRegistry,
    pub(crate) events: EventBus,
    pub(crate) config: EngineConfig,
    pub(crate) workers: Arc<Semaphore>,
}

/// Keeps device snapshots in sync with a remote service and dispatches
/// commands to it.
///
/// Cloning is cheap; every clone drives the same state.
///
/// # Examples
///
/// ```no_run
/// use heatlink::{Change, Engine, EngineConfig, HttpRemoteConfig, Target};
/// use heatlink::model::ZoneId;
///
/// #[tokio::main]
/// async fn main() -> heatlink::Result<()> {
///     let client = HttpRemoteConfig::new("192.168.1.20:8080").into_client()?;
///     let engine = Engine::new(client, EngineConfig::default())?;
///
///     engine.poll_once().await?;
///     let poller = engine.start();
///
///     for id in engine.device_ids() {
///         engine
///             .apply(&id, Target::Zone(ZoneId::FIRST), Change::TargetTemperature(21.5))
///             .await?;
///     }
///
///     poller.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct Engine<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for Engine<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C> std::fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.shared.config)
            .field("devices", &self.shared.store.known_ids().len())
            .finish_non_exhaustive()
    }
}

impl<C: RemoteClient> Engine<C> {
    /// Creates an engine with a learning capability registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config` is invalid.
    pub fn new(client: C, config: EngineConfig) -> Result<Self> {
        Self::with_registry(client, config, CapabilityRegistry::new())
    }

    /// Creates an engine with the given capability registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config` is invalid.
    pub fn with_registry(
        client: C,
        config: EngineConfig,
        registry: CapabilityRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let shared = Shared {
            client,
            store: StateStore::new(),
            registry,
            events: EventBus::with_capacity(config.event_capacity()),
            workers: Arc::new(Semaphore::new(config.worker_count())),
            config,
        };
        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    /// Returns the current snapshot of a device, or `None` if it has none.
    #[must_use]
    pub fn get_snapshot(&self, device_id: &str) -> Option<Arc<Snapshot>> {
        self.shared.store.get(device_id)
    }

    /// Returns every device snapshot, ordered by device id.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        self.shared.store.snapshots()
    }

    /// Returns the ids of devices that have a snapshot, sorted.
    #[must_use]
    pub fn device_ids(&self) -> Vec<String> {
        self.shared.store.device_ids()
    }

    /// Applies a change to a device.
    ///
    /// The change is visible through [`get_snapshot`](Self::get_snapshot)
    /// as soon as it passes validation, whatever the remote outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownDevice`](crate::Error::UnknownDevice) if the device
    ///   has no snapshot
    /// - [`Error::Validation`](crate::Error::Validation) if the change is
    ///   rejected; nothing is modified
    /// - [`Error::RemoteUnavailable`](crate::Error::RemoteUnavailable) if no
    ///   remote operation accepted it; the local change is kept
    pub async fn apply(&self, device_id: &str, target: Target, change: Change) -> Result<Snapshot> {
        dispatcher::apply(&self.shared, device_id, target, change).await
    }

    /// Subscribes to engine events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.events.subscribe()
    }

    /// Starts the background poll loop.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use = "dropping the handle stops the poll loop"]
    pub fn start(&self) -> PollerHandle {
        poller::spawn(Arc::clone(&self.shared))
    }

    /// Runs a single poll cycle to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UpstreamEnumeration`](crate::Error::UpstreamEnumeration)
    /// if listing devices fails; the store is left untouched.
    pub async fn poll_once(&self) -> Result<PollReport> {
        poller::poll_once(&self.shared).await
    }

    /// Returns the capability registry.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.shared.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Returns the remote client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.shared.client
    }
}
