// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory remote service for engine tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use heatlink::model::ZoneId;
use heatlink::remote::{DeviceInfo, OperationArg, RawStatus, RemoteClient, ZoneInfo};
use heatlink::RemoteError;
use parking_lot::Mutex;
use serde_json::{Value, json};

/// One recorded `invoke` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub device_id: String,
    pub operation: String,
    pub args: Vec<OperationArg>,
}

#[derive(Default)]
struct State {
    devices: Vec<DeviceInfo>,
    statuses: HashMap<String, Value>,
    failing_fetches: HashSet<String>,
    listing_fails: bool,
    accepted: Option<HashSet<String>>,
    rejected: HashSet<String>,
    hanging: HashSet<String>,
    fetch_delay: Option<Duration>,
    invocations: Vec<Invocation>,
    fetches: HashMap<String, usize>,
    fetches_in_flight: usize,
    peak_fetches_in_flight: usize,
}

/// A remote service whose answers are set by the test.
///
/// Clones share state, so a test keeps one clone to script the service
/// after handing another to the engine.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<State>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a device and its status document.
    pub fn add_device(&self, info: DeviceInfo, status: Value) {
        let mut state = self.state.lock();
        state.devices.retain(|d| d.id != info.id);
        state.statuses.insert(info.id.clone(), status);
        state.devices.push(info);
    }

    /// Stops listing a device.
    pub fn remove_device(&self, device_id: &str) {
        self.state.lock().devices.retain(|d| d.id != device_id);
    }

    pub fn set_status(&self, device_id: &str, status: Value) {
        self.state.lock().statuses.insert(device_id.to_string(), status);
    }

    pub fn fail_fetch(&self, device_id: &str, failing: bool) {
        let mut state = self.state.lock();
        if failing {
            state.failing_fetches.insert(device_id.to_string());
        } else {
            state.failing_fetches.remove(device_id);
        }
    }

    pub fn fail_listing(&self, failing: bool) {
        self.state.lock().listing_fails = failing;
    }

    /// Only the named operations succeed; every other one is unsupported.
    pub fn accept_only(&self, operations: &[&str]) {
        self.state.lock().accepted = Some(operations.iter().map(ToString::to_string).collect());
    }

    /// Every operation is unsupported.
    pub fn accept_none(&self) {
        self.accept_only(&[]);
    }

    /// The named operation is rejected with an error.
    pub fn reject(&self, operation: &str) {
        self.state.lock().rejected.insert(operation.to_string());
    }

    /// The named operation never answers.
    pub fn hang(&self, operation: &str) {
        self.state.lock().hanging.insert(operation.to_string());
    }

    /// Every status fetch waits this long before answering.
    pub fn delay_fetches(&self, delay: Duration) {
        self.state.lock().fetch_delay = Some(delay);
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().invocations.clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.operation).collect()
    }

    pub fn clear_invocations(&self) {
        self.state.lock().invocations.clear();
    }

    pub fn fetch_count(&self, device_id: &str) -> usize {
        self.state.lock().fetches.get(device_id).copied().unwrap_or(0)
    }

    /// Highest number of status fetches that were running at the same time.
    pub fn peak_concurrent_fetches(&self) -> usize {
        self.state.lock().peak_fetches_in_flight
    }
}

impl RemoteClient for FakeRemote {
    async fn list_devices(&self) -> Result<Vec<DeviceInfo>, RemoteError> {
        let state = self.state.lock();
        if state.listing_fails {
            return Err(RemoteError::ConnectionFailed("listing down".to_string()));
        }
        Ok(state.devices.clone())
    }

    async fn fetch_status(&self, device: &DeviceInfo) -> Result<RawStatus, RemoteError> {
        let (result, delay) = {
            let mut state = self.state.lock();
            *state.fetches.entry(device.id.clone()).or_default() += 1;
            state.fetches_in_flight += 1;
            state.peak_fetches_in_flight =
                state.peak_fetches_in_flight.max(state.fetches_in_flight);
            let result = if state.failing_fetches.contains(&device.id) {
                Err(RemoteError::Rejected("status unavailable".to_string()))
            } else {
                state
                    .statuses
                    .get(&device.id)
                    .cloned()
                    .map(RawStatus::Document)
                    .ok_or_else(|| RemoteError::Rejected("no such device".to_string()))
            };
            (result, state.fetch_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.state.lock().fetches_in_flight -= 1;
        result
    }

    async fn invoke(
        &self,
        device: &DeviceInfo,
        operation: &str,
        args: &[OperationArg],
    ) -> Result<(), RemoteError> {
        let (result, hangs) = {
            let mut state = self.state.lock();
            state.invocations.push(Invocation {
                device_id: device.id.clone(),
                operation: operation.to_string(),
                args: args.to_vec(),
            });
            let result = if state.rejected.contains(operation) {
                Err(RemoteError::Rejected(format!("{operation} failed")))
            } else if state
                .accepted
                .as_ref()
                .is_some_and(|accepted| !accepted.contains(operation))
            {
                Err(RemoteError::Unsupported(operation.to_string()))
            } else {
                Ok(())
            };
            (result, state.hanging.contains(operation))
        };
        if hangs {
            std::future::pending::<()>().await;
        }
        result
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A two-zone device with a tank.
pub fn heat_pump(id: &str) -> DeviceInfo {
    DeviceInfo::new(id)
        .with_class("gen2")
        .with_zone(ZoneInfo::new(ZoneId::FIRST).with_name("Ground floor"))
        .with_zone(ZoneInfo::new(zone(2)))
        .with_tank()
}

/// A single-zone device without a tank.
pub fn small_unit(id: &str) -> DeviceInfo {
    DeviceInfo::new(id)
        .with_class("gen1")
        .with_zone(ZoneInfo::new(ZoneId::FIRST))
}

pub fn zone(id: u8) -> ZoneId {
    ZoneId::new(id).unwrap()
}

/// A status document in the loose upstream format.
///
/// Zone temperatures are in tenths of a degree; `heat_set` is relative to
/// the zone's current temperature.
pub fn status_doc(id: &str, zones: &[(u8, i64, i64)], tank_target: i64) -> Value {
    let zones: Vec<Value> = zones
        .iter()
        .map(|(zone_id, now, heat_set)| {
            json!({ "zoneId": zone_id, "temperatureNow": now, "heatSet": heat_set })
        })
        .collect();
    json!({
        "deviceGuid": id,
        "a2wName": "Heat pump",
        "status": {
            "operationMode": 1,
            "zoneStatus": zones,
            "tankStatus": {
                "temperatureNow": 48,
                "heatSet": tank_target,
                "operationStatus": 1,
                "ecoTemp": 50,
                "comfortTemp": 62
            },
            "outdoorNow": 7
        }
    })
}
