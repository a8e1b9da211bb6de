// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command dispatch.
//!
//! A command runs under the device lock:
//!
//! 1. validate the change against the current snapshot,
//! 2. apply it locally and publish the result,
//! 3. try the candidate remote operations, best ranked first,
//! 4. on success, schedule a confirmation fetch; on exhaustion, flag the
//!    snapshot as pending remote confirmation.
//!
//! The local change is never rolled back.

mod change;
mod mutate;
mod validate;

use std::sync::Arc;

use chrono::Utc;
use tokio::time::timeout;
use tracing::Instrument;

pub use change::{Change, Target};

use crate::engine::Shared;
use crate::error::{Error, RemoteError, Result};
use crate::event::{CommandId, EngineEvent, UpdateSource};
use crate::model::Snapshot;
use crate::poller::refresh;
use crate::remote::RemoteClient;
use crate::store::DeviceSlot;

/// Applies `change` to `target` on a device.
pub(crate) async fn apply<C: RemoteClient>(
    shared: &Arc<Shared<C>>,
    device_id: &str,
    target: Target,
    change: Change,
) -> Result<Snapshot> {
    let command_id = CommandId::new();
    let span = tracing::info_span!("command", %command_id, device_id, %target, %change);
    execute(shared, command_id, device_id, target, change)
        .instrument(span)
        .await
}

async fn execute<C: RemoteClient>(
    shared: &Arc<Shared<C>>,
    command_id: CommandId,
    device_id: &str,
    target: Target,
    change: Change,
) -> Result<Snapshot> {
    let unknown = || Error::UnknownDevice(device_id.to_string());
    let slot = shared.store.slot(device_id).ok_or_else(unknown)?;
    let guard = slot.lock().await;
    let current = slot.snapshot().ok_or_else(unknown)?;

    validate::validate(current.device(), target, &change, &shared.config)?;
    let kind = change.kind_for(target)?;

    let device = mutate::mutate(current.device(), target, &change);
    let applied = slot.publish(&guard, current.modified(device, Utc::now()));
    shared.events.publish(EngineEvent::snapshot_updated(
        UpdateSource::Command,
        Arc::clone(&applied),
    ));
    tracing::debug!(%kind, "Applied change locally");

    let info = slot.info();
    let class = &info.device_class;
    let limit = shared.config.invoke_timeout();
    let candidates = shared.registry.ranked_candidates(class, kind);
    let mut attempts = 0;

    for operation in &candidates {
        attempts += 1;
        let args = change.arguments(target, operation.shape());
        let outcome = match timeout(limit, shared.client.invoke(&info, operation.name(), &args)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::timeout(limit)),
        };
        shared
            .registry
            .record_outcome(class, operation, outcome.is_ok());

        match outcome {
            Ok(()) => {
                tracing::info!(operation = operation.name(), attempts, "Remote accepted command");
                let accepted = if applied.is_pending_remote_confirmation() {
                    let cleared = slot.publish(&guard, applied.with_pending_confirmation(false));
                    shared.events.publish(EngineEvent::snapshot_updated(
                        UpdateSource::Command,
                        Arc::clone(&cleared),
                    ));
                    cleared
                } else {
                    applied
                };
                shared.events.publish(EngineEvent::CommandAccepted {
                    command_id,
                    device_id: device_id.to_string(),
                    kind,
                    operation: operation.name(),
                });
                drop(guard);
                schedule_confirmation(Arc::clone(shared), slot, command_id);
                return Ok(Snapshot::clone(&accepted));
            }
            Err(e) if e.is_unsupported() => {
                tracing::debug!(operation = operation.name(), "Operation not supported");
            }
            Err(e) => {
                tracing::warn!(operation = operation.name(), error = %e, "Remote operation failed");
            }
        }
    }

    tracing::warn!(attempts, "No remote operation accepted the command");
    let pending = slot.publish(&guard, applied.with_pending_confirmation(true));
    shared.events.publish(EngineEvent::snapshot_updated(
        UpdateSource::Command,
        Arc::clone(&pending),
    ));
    shared.events.publish(EngineEvent::CommandUnconfirmed {
        command_id,
        device_id: device_id.to_string(),
        attempts,
    });

    Err(Error::RemoteUnavailable {
        device_id: device_id.to_string(),
        attempts,
        snapshot: Box::new(Snapshot::clone(&pending)),
    })
}

/// Refreshes the device from the remote service after a delay.
///
/// Skipped if the device was evicted in the meantime. A failed fetch is
/// only logged; the snapshot stays as the command left it.
fn schedule_confirmation<C: RemoteClient>(
    shared: Arc<Shared<C>>,
    slot: Arc<DeviceSlot>,
    command_id: CommandId,
) {
    let span = tracing::Span::current();
    tokio::spawn(
        async move {
            tokio::time::sleep(shared.config.confirmation_delay()).await;
            let guard = slot.lock().await;
            let device_id = slot.info().id;

            let still_tracked = shared
                .store
                .slot(&device_id)
                .is_some_and(|current| Arc::ptr_eq(&current, &slot));
            if !still_tracked {
                tracing::debug!("Device evicted before confirmation");
                return;
            }

            match refresh(&shared, &slot, &guard, UpdateSource::Confirmation).await {
                Ok(_) => {
                    tracing::debug!("Command confirmed");
                    shared.events.publish(EngineEvent::CommandConfirmed {
                        command_id,
                        device_id,
                    });
                }
                Err(e) => tracing::warn!(error = %e, "Confirmation fetch failed"),
            }
        }
        .instrument(span),
    );
}
