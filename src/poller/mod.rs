// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic device polling.
//!
//! A poll cycle lists the devices, evicts the ones that stayed absent for
//! too long, and fetches the status of every listed device through a
//! bounded worker pool. Devices whose lock is held are skipped for that
//! cycle.

mod fetch;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, timeout};

use crate::engine::Shared;
use crate::error::{Error, RemoteError, Result};
use crate::event::EngineEvent;
use crate::remote::RemoteClient;

pub(crate) use fetch::{FetchOutcome, refresh};

/// Summary of one poll cycle.
///
/// Every list is sorted by device id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Devices with a freshly published snapshot.
    pub succeeded: Vec<String>,
    /// Devices whose fetch failed.
    pub failed: Vec<String>,
    /// Devices skipped because they were busy.
    pub skipped: Vec<String>,
    /// Devices removed after staying absent for too long.
    pub evicted: Vec<String>,
}

impl PollReport {
    /// Returns the number of devices a fetch was attempted for.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    fn sort(&mut self) {
        self.succeeded.sort();
        self.failed.sort();
        self.skipped.sort();
        self.evicted.sort();
    }
}

/// Runs one poll cycle to completion.
pub(crate) async fn poll_once<C: RemoteClient>(shared: &Arc<Shared<C>>) -> Result<PollReport> {
    let limit = shared.config.fetch_timeout();
    let listed = match timeout(limit, shared.client.list_devices()).await {
        Ok(Ok(devices)) => devices,
        Ok(Err(e)) => return Err(enumeration_failed(shared, e)),
        Err(_) => return Err(enumeration_failed(shared, RemoteError::timeout(limit))),
    };

    let mut report = PollReport::default();
    let present: HashSet<&str> = listed.iter().map(|d| d.id.as_str()).collect();

    for device_id in shared.store.known_ids() {
        if present.contains(device_id.as_str()) {
            continue;
        }
        let Some(slot) = shared.store.slot(&device_id) else {
            continue;
        };
        let absent = slot.mark_absent();
        tracing::debug!(%device_id, absent, "Device missing from enumeration");
        if absent >= shared.config.eviction_threshold() && shared.store.remove(&device_id) {
            tracing::info!(%device_id, absent, "Evicted device");
            shared.events.publish(EngineEvent::DeviceEvicted {
                device_id: device_id.clone(),
            });
            report.evicted.push(device_id);
        }
    }

    let mut tasks = JoinSet::new();
    for info in listed {
        if info.id.trim().is_empty() {
            tracing::warn!("Ignoring listed device without an id");
            continue;
        }
        let device_id = info.id.clone();
        let slot = shared.store.upsert(info);
        slot.mark_present();
        let shared = Arc::clone(shared);
        tasks.spawn(async move { (device_id, fetch::poll_device(shared, slot).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((device_id, FetchOutcome::Succeeded)) => report.succeeded.push(device_id),
            Ok((device_id, FetchOutcome::Failed(_))) => report.failed.push(device_id),
            Ok((device_id, FetchOutcome::Skipped)) => report.skipped.push(device_id),
            Err(e) => tracing::warn!(error = %e, "Poll task failed"),
        }
    }

    report.sort();
    tracing::debug!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        evicted = report.evicted.len(),
        "Poll cycle complete"
    );
    Ok(report)
}

fn enumeration_failed<C: RemoteClient>(shared: &Shared<C>, error: RemoteError) -> Error {
    tracing::warn!(error = %error, "Device enumeration failed");
    shared.events.publish(EngineEvent::EnumerationFailed {
        reason: error.to_string(),
    });
    Error::UpstreamEnumeration(error)
}

// =============================================================================
// Background loop
// =============================================================================

/// Handle to a running poll loop.
///
/// Dropping the handle also stops the loop at its next wake-up.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the loop and waits for it to exit.
    ///
    /// A cycle already in flight runs to completion in the background.
    pub async fn shutdown(self) {
        // The loop may already be gone; either way it stops.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Poll loop ended abnormally");
        }
    }

    /// Returns `true` once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Starts the poll loop. The first cycle runs immediately.
pub(crate) fn spawn<C: RemoteClient>(shared: Arc<Shared<C>>) -> PollerHandle {
    let (shutdown, mut stop) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(shared.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval = ?shared.config.poll_interval(), "Poll loop started");

        loop {
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let shared = Arc::clone(&shared);
                    // Shutdown never cancels a running cycle.
                    tokio::spawn(async move {
                        if let Err(e) = poll_once(&shared).await {
                            tracing::debug!(error = %e, "Poll cycle aborted");
                        }
                    });
                }
            }
        }

        tracing::info!("Poll loop stopped");
    });

    PollerHandle { shutdown, task }
}
