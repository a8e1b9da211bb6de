// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `heatlink` library.
//!
//! The hierarchy mirrors how failures are handled by the engine:
//!
//! - [`ValidationError`]: the caller asked for something impossible; nothing
//!   was mutated.
//! - [`RemoteError`]: a single call to the remote service failed.
//! - [`AdapterError`]: an upstream payload could not be attributed to a device.
//! - [`ConfigError`]: an [`EngineConfig`](crate::EngineConfig) is unusable.
//!
//! Missing or malformed optional upstream fields are never errors; they are
//! reported as [`DataQualityWarning`](crate::adapter::DataQualityWarning)
//! values and replaced with defaults.

use std::time::Duration;

use thiserror::Error;

use crate::model::Snapshot;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested change was rejected before any mutation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Every candidate remote operation failed or timed out.
    ///
    /// The optimistic change is still applied locally; `snapshot` is the
    /// state consumers now see, flagged as pending remote confirmation.
    #[error("remote service unavailable for device {device_id} after {attempts} attempt(s)")]
    RemoteUnavailable {
        /// The device the command targeted.
        device_id: String,
        /// Number of remote operations tried.
        attempts: usize,
        /// The locally applied, unconfirmed snapshot.
        snapshot: Box<Snapshot>,
    },

    /// The device id is not present in the state store.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// Listing devices from the remote service failed.
    #[error("device enumeration failed: {0}")]
    UpstreamEnumeration(#[source] RemoteError),

    /// A remote call failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// An upstream payload could not be normalized.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// The engine configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the locally applied snapshot when the error still left the
    /// optimistic change in place.
    #[must_use]
    pub fn applied_snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::RemoteUnavailable { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

/// Errors raised while validating a command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A temperature is outside the allowed range for its target.
    #[error("{field} {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Which value was checked.
        field: &'static str,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The value that was provided.
        actual: f64,
    },

    /// A temperature is NaN or infinite.
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    /// The zone does not exist on the device.
    #[error("zone {0} does not exist on this device")]
    UnknownZone(u8),

    /// A tank change was requested for a device without a tank.
    #[error("device has no hot-water tank")]
    NoTank,

    /// The change cannot be applied to the given target.
    #[error("{change} cannot be applied to {target}")]
    UnsupportedChange {
        /// Description of the target.
        target: String,
        /// Description of the change.
        change: String,
    },

    /// Holiday duration outside the accepted range.
    #[error("holiday duration {0} days is out of range [1, 365]")]
    InvalidHolidayDays(u16),
}

/// Errors related to calls to the remote device-control service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not complete in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The remote does not offer this operation for the device.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// The remote accepted the call but refused it.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The remote service could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The response body could not be understood.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl RemoteError {
    /// Builds a timeout error from a duration.
    #[must_use]
    pub fn timeout(after: std::time::Duration) -> Self {
        Self::Timeout(u64::try_from(after.as_millis()).unwrap_or(u64::MAX))
    }

    /// Returns `true` if the remote reported the operation as missing.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// Errors that make an upstream payload unusable as a whole.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The device identity could not be determined.
    #[error("device identity missing from payload")]
    MissingIdentity,

    /// The payload belongs to another device.
    #[error("payload is for device {found}, expected {expected}")]
    IdentityMismatch {
        /// The device id the payload was requested for.
        expected: String,
        /// The device id found in the payload.
        found: String,
    },
}

/// Errors in engine configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A duration that must be positive is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// A count that must be positive is zero.
    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),

    /// The fetch timeout would let poll cycles overlap.
    #[error("fetch_timeout ({timeout:?}) must be shorter than poll_interval ({interval:?})")]
    FetchTimeoutTooLong {
        /// Configured fetch timeout.
        timeout: Duration,
        /// Configured poll interval.
        interval: Duration,
    },

    /// A temperature range has `min > max`.
    #[error("{field} range is inverted: [{min}, {max}]")]
    InvertedRange {
        /// Which range was checked.
        field: &'static str,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
