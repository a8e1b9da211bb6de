// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device status fetch.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::timeout;

use crate::adapter;
use crate::engine::Shared;
use crate::error::{RemoteError, Result};
use crate::event::{EngineEvent, UpdateSource};
use crate::model::Snapshot;
use crate::remote::RemoteClient;
use crate::store::{DeviceGuard, DeviceSlot};

/// Result of polling one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    /// A fresh snapshot was published.
    Succeeded,
    /// The fetch failed; carries the reason.
    Failed(String),
    /// The device lock was held elsewhere.
    Skipped,
}

/// Fetches, normalizes and publishes the status of a device.
///
/// The caller holds the device lock; `guard` proves it.
pub(crate) async fn refresh<C: RemoteClient>(
    shared: &Shared<C>,
    slot: &DeviceSlot,
    guard: &DeviceGuard,
    source: UpdateSource,
) -> Result<Arc<Snapshot>> {
    let info = slot.info();
    let limit = shared.config.fetch_timeout();

    let raw = timeout(limit, shared.client.fetch_status(&info))
        .await
        .map_err(|_| RemoteError::timeout(limit))??;

    let (device, warnings) = adapter::normalize(&info, &raw)?;
    for warning in &warnings {
        tracing::warn!(target: "heatlink::adapter", device_id = %info.id, %warning, "Data quality issue");
    }

    let snapshot = slot.publish(guard, Snapshot::fetched(device, Utc::now()));
    tracing::debug!(
        device_id = %info.id,
        %source,
        warnings = warnings.len(),
        "Published snapshot"
    );
    shared
        .events
        .publish(EngineEvent::snapshot_updated(source, Arc::clone(&snapshot)));
    Ok(snapshot)
}

/// Polls one device if it is not busy.
///
/// Waits for a worker permit, then tries the device lock. A failed fetch
/// keeps the previous snapshot, flagged stale.
pub(crate) async fn poll_device<C: RemoteClient>(
    shared: Arc<Shared<C>>,
    slot: Arc<DeviceSlot>,
) -> FetchOutcome {
    let Ok(_permit) = Arc::clone(&shared.workers).acquire_owned().await else {
        return FetchOutcome::Skipped;
    };

    let device_id = slot.info().id;
    let Some(guard) = slot.try_lock() else {
        let consecutive = slot.record_skip();
        tracing::debug!(%device_id, consecutive, "Device busy, skipping poll");
        if consecutive >= shared.config.backpressure_warn_after() {
            tracing::warn!(%device_id, consecutive, "Device repeatedly busy during polls");
            shared.events.publish(EngineEvent::PollSkipped {
                device_id,
                consecutive,
            });
        }
        return FetchOutcome::Skipped;
    };
    slot.reset_skips();

    match refresh(&shared, &slot, &guard, UpdateSource::Poll).await {
        Ok(_) => FetchOutcome::Succeeded,
        Err(e) => {
            let reason = e.to_string();
            tracing::warn!(%device_id, error = %reason, "Status fetch failed");
            if let Some(previous) = slot.snapshot() {
                slot.publish(&guard, previous.marked_stale());
                shared.events.publish(EngineEvent::DeviceStale {
                    device_id,
                    reason: reason.clone(),
                });
            }
            FetchOutcome::Failed(reason)
        }
    }
}
