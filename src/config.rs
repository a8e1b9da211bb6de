// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ConfigError;

/// Tuning parameters of an [`Engine`](crate::Engine).
///
/// # Examples
///
/// ```
/// use heatlink::EngineConfig;
/// use std::time::Duration;
///
/// let config = EngineConfig::default()
///     .with_poll_interval(Duration::from_secs(60))
///     .with_worker_count(2)
///     .with_tank_range(45.0, 70.0);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.eviction_threshold(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    poll_interval: Duration,
    fetch_timeout: Duration,
    invoke_timeout: Duration,
    confirmation_delay: Duration,
    eviction_threshold: u32,
    worker_count: usize,
    backpressure_warn_after: u32,
    event_capacity: usize,
    zone_range: (f64, f64),
    tank_range: (f64, f64),
}

impl EngineConfig {
    /// Default time between poll cycles.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
    /// Default timeout for listing devices and fetching a status.
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default timeout of a single remote operation.
    pub const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default delay before the confirmation fetch that follows a command.
    pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_secs(1);
    /// Default number of consecutive absent cycles before eviction.
    pub const DEFAULT_EVICTION_THRESHOLD: u32 = 3;
    /// Default number of concurrent status fetches.
    pub const DEFAULT_WORKER_COUNT: usize = 4;
    /// Default number of consecutive skipped polls before warning.
    pub const DEFAULT_BACKPRESSURE_WARN_AFTER: u32 = 3;
    /// Default event channel capacity.
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;
    /// Default accepted zone target range in degrees Celsius.
    pub const DEFAULT_ZONE_RANGE: (f64, f64) = (-5.0, 30.0);
    /// Default accepted tank target range in degrees Celsius.
    pub const DEFAULT_TANK_RANGE: (f64, f64) = (40.0, 75.0);

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the per-operation invoke timeout.
    #[must_use]
    pub fn with_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.invoke_timeout = timeout;
        self
    }

    /// Sets the confirmation delay.
    #[must_use]
    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    /// Sets how many consecutive cycles a device may be absent before it
    /// is evicted.
    #[must_use]
    pub fn with_eviction_threshold(mut self, cycles: u32) -> Self {
        self.eviction_threshold = cycles;
        self
    }

    /// Sets the number of concurrent status fetches.
    #[must_use]
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Sets how many consecutive skipped polls trigger a backpressure
    /// warning.
    #[must_use]
    pub fn with_backpressure_warn_after(mut self, skips: u32) -> Self {
        self.backpressure_warn_after = skips;
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the accepted zone target range.
    #[must_use]
    pub fn with_zone_range(mut self, min: f64, max: f64) -> Self {
        self.zone_range = (min, max);
        self
    }

    /// Sets the accepted tank target range.
    #[must_use]
    pub fn with_tank_range(mut self, min: f64, max: f64) -> Self {
        self.tank_range = (min, max);
        self
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the fetch timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Returns the invoke timeout.
    #[must_use]
    pub fn invoke_timeout(&self) -> Duration {
        self.invoke_timeout
    }

    /// Returns the confirmation delay.
    #[must_use]
    pub fn confirmation_delay(&self) -> Duration {
        self.confirmation_delay
    }

    /// Returns the eviction threshold.
    #[must_use]
    pub fn eviction_threshold(&self) -> u32 {
        self.eviction_threshold
    }

    /// Returns the worker count.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Returns the backpressure warning threshold.
    #[must_use]
    pub fn backpressure_warn_after(&self) -> u32 {
        self.backpressure_warn_after
    }

    /// Returns the event channel capacity.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// Returns the accepted zone target range.
    #[must_use]
    pub fn zone_range(&self) -> RangeInclusive<f64> {
        self.zone_range.0..=self.zone_range.1
    }

    /// Returns the accepted tank target range.
    #[must_use]
    pub fn tank_range(&self) -> RangeInclusive<f64> {
        self.tank_range.0..=self.tank_range.1
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for zero durations or counts, for a fetch
    /// timeout that is not shorter than the poll interval, and for inverted
    /// or non-finite temperature ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("poll_interval", self.poll_interval),
            ("fetch_timeout", self.fetch_timeout),
            ("invoke_timeout", self.invoke_timeout),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }

        // A cycle must finish listing before the next tick, or absences are
        // counted twice per interval.
        if self.fetch_timeout >= self.poll_interval {
            return Err(ConfigError::FetchTimeoutTooLong {
                timeout: self.fetch_timeout,
                interval: self.poll_interval,
            });
        }

        if self.eviction_threshold == 0 {
            return Err(ConfigError::ZeroCount("eviction_threshold"));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroCount("worker_count"));
        }
        if self.backpressure_warn_after == 0 {
            return Err(ConfigError::ZeroCount("backpressure_warn_after"));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroCount("event_capacity"));
        }

        for (field, (min, max)) in [("zone", self.zone_range), ("tank", self.tank_range)] {
            if min.is_nan() || max.is_nan() || min > max {
                return Err(ConfigError::InvertedRange { field, min, max });
            }
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            invoke_timeout: Self::DEFAULT_INVOKE_TIMEOUT,
            confirmation_delay: Self::DEFAULT_CONFIRMATION_DELAY,
            eviction_threshold: Self::DEFAULT_EVICTION_THRESHOLD,
            worker_count: Self::DEFAULT_WORKER_COUNT,
            backpressure_warn_after: Self::DEFAULT_BACKPRESSURE_WARN_AFTER,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            zone_range: Self::DEFAULT_ZONE_RANGE,
            tank_range: Self::DEFAULT_TANK_RANGE,
        }
    }
}
