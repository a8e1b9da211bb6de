// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interface to the remote device-control service.
//!
//! The engine only talks to the remote service through the [`RemoteClient`]
//! trait. A reference HTTP/JSON implementation, [`HttpRemoteClient`], is
//! available with the `http` feature (enabled by default).
//!
//! # Payloads
//!
//! Status payloads come in two shapes, see [`RawStatus`]. Both are turned
//! into the canonical [`Device`](crate::model::Device) by
//! [`adapter::normalize`](crate::adapter::normalize).

#[cfg(feature = "http")]
mod http;
mod status;

#[cfg(feature = "http")]
pub use http::{HttpRemoteClient, HttpRemoteConfig};
pub use status::{RawStatus, StructuredStatus, StructuredTank, StructuredZone};

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::model::{DeviceClass, ZoneId};

/// A zone as listed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Zone identifier.
    #[serde(alias = "zoneId")]
    pub id: ZoneId,
    /// Zone name, if the service reports one.
    #[serde(default, alias = "zoneName")]
    pub name: Option<String>,
}

impl ZoneInfo {
    /// Creates a zone entry without a name.
    #[must_use]
    pub fn new(id: ZoneId) -> Self {
        Self { id, name: None }
    }

    /// Sets the zone name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A device as listed by the remote service.
///
/// `zones` is the zone manifest: status payloads are filtered to these
/// zones. An empty manifest accepts every zone upstream reports.
///
/// # Examples
///
/// ```
/// use heatlink::model::ZoneId;
/// use heatlink::remote::{DeviceInfo, ZoneInfo};
///
/// let info = DeviceInfo::new("hp-1")
///     .with_name("Heat pump")
///     .with_zone(ZoneInfo::new(ZoneId::FIRST))
///     .with_tank();
///
/// assert!(info.has_tank);
/// assert_eq!(info.device_class.as_str(), "default");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Stable device identifier assigned by the remote service.
    pub id: String,
    /// Display name, if the service reports one.
    #[serde(default)]
    pub name: Option<String>,
    /// Hardware class.
    #[serde(default, alias = "device_class")]
    pub device_class: DeviceClass,
    /// Zone manifest.
    #[serde(default)]
    pub zones: Vec<ZoneInfo>,
    /// Whether the device has a hot-water tank.
    #[serde(default, alias = "has_tank")]
    pub has_tank: bool,
}

impl DeviceInfo {
    /// Creates device info with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            device_class: DeviceClass::default(),
            zones: Vec::new(),
            has_tank: false,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the device class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<DeviceClass>) -> Self {
        self.device_class = class.into();
        self
    }

    /// Adds a zone to the manifest.
    #[must_use]
    pub fn with_zone(mut self, zone: ZoneInfo) -> Self {
        self.zones.push(zone);
        self
    }

    /// Marks the device as having a hot-water tank.
    #[must_use]
    pub fn with_tank(mut self) -> Self {
        self.has_tank = true;
        self
    }

    /// Returns the manifest entry for a zone.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&ZoneInfo> {
        self.zones.iter().find(|z| z.id == id)
    }
}

/// A single argument of a remote operation.
///
/// Serialized as a bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationArg {
    /// Zone number.
    Zone(u8),
    /// Numeric value.
    Number(f64),
    /// Integer value, such as a day count.
    Integer(i64),
    /// On/off flag.
    Flag(bool),
    /// Symbolic value, such as a mode name.
    Text(String),
}

impl fmt::Display for OperationArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone(zone) => write!(f, "zone {zone}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Client for the remote device-control service.
///
/// Every method returns a `Send` future so the engine can run calls on
/// spawned tasks. Implementations may use `async fn`.
///
/// An implementation signals that a device does not offer an operation by
/// returning [`RemoteError::Unsupported`]. Any error counts as a failure of
/// that operation for the device's class.
pub trait RemoteClient: Send + Sync + 'static {
    /// Lists every device the account can see.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<DeviceInfo>, RemoteError>> + Send;

    /// Fetches the current status of a device.
    fn fetch_status(
        &self,
        device: &DeviceInfo,
    ) -> impl Future<Output = Result<RawStatus, RemoteError>> + Send;

    /// Invokes a named control operation on a device.
    fn invoke(
        &self,
        device: &DeviceInfo,
        operation: &str,
        args: &[OperationArg],
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_info_from_camel_case() {
        let json = r#"{
            "id": "hp-1",
            "name": "Heat pump",
            "deviceClass": "gen2",
            "zones": [{"zoneId": 1, "zoneName": "Ground"}, {"id": 2}],
            "hasTank": true
        }"#;
        let info: DeviceInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.device_class.as_str(), "gen2");
        assert_eq!(info.zones.len(), 2);
        assert_eq!(info.zones[0].name.as_deref(), Some("Ground"));
        assert!(info.zones[1].name.is_none());
        assert!(info.has_tank);
    }

    #[test]
    fn device_info_defaults() {
        let info: DeviceInfo = serde_json::from_str(r#"{"id": "hp-1"}"#).unwrap();
        assert_eq!(info, DeviceInfo::new("hp-1"));
    }

    #[test]
    fn device_info_snake_case_aliases() {
        let json = r#"{"id": "hp-1", "device_class": "gen1", "has_tank": true}"#;
        let info: DeviceInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.device_class.as_str(), "gen1");
        assert!(info.has_tank);
    }

    #[test]
    fn operation_args_serialize_as_scalars() {
        let args = vec![
            OperationArg::Zone(1),
            OperationArg::Number(21.5),
            OperationArg::Flag(true),
            OperationArg::Text("heat".to_string()),
        ];
        let json = serde_json::to_string(&args).unwrap();
        assert_eq!(json, r#"[1,21.5,true,"heat"]"#);
    }
}
