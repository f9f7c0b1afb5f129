//! Controller configuration.

use std::time::Duration;

use modulock_core::constants::{
    DEFAULT_MAX_REQUESTS_PER_TICK, DEFAULT_NOTICE_CAPACITY, DEFAULT_REQUEST_QUEUE_DEPTH,
    DEFAULT_TICK_MS, INDICATOR_PULSE_MS, LOCK_PULSE_MS, SCAN_STALENESS_MS,
};

/// Timing and queueing parameters of the control loop.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use modulock_engine::ControllerConfig;
///
/// let config = ControllerConfig::default()
///     .lock_pulse(Duration::from_millis(1500))
///     .max_requests_per_tick(4);
///
/// assert_eq!(config.lock_pulse, Duration::from_millis(1500));
/// assert_eq!(config.indicator_pulse, Duration::from_millis(2000));
/// ```
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Period of the poll loop
    pub tick_interval: Duration,

    /// How long the lock stays released after a trigger
    pub lock_pulse: Duration,

    /// How long an indicator stays lit after a trigger
    pub indicator_pulse: Duration,

    /// Age at which the last scanned UID is no longer offered for registration
    pub scan_staleness: Duration,

    /// Upper bound on channel requests applied per tick
    pub max_requests_per_tick: usize,

    /// Capacity of the request queue shared by all channel handles
    pub request_queue_depth: usize,

    /// Capacity of the notice broadcast buffer
    pub notice_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            lock_pulse: Duration::from_millis(LOCK_PULSE_MS),
            indicator_pulse: Duration::from_millis(INDICATOR_PULSE_MS),
            scan_staleness: Duration::from_millis(SCAN_STALENESS_MS),
            max_requests_per_tick: DEFAULT_MAX_REQUESTS_PER_TICK,
            request_queue_depth: DEFAULT_REQUEST_QUEUE_DEPTH,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
        }
    }
}

impl ControllerConfig {
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn lock_pulse(mut self, pulse: Duration) -> Self {
        self.lock_pulse = pulse;
        self
    }

    pub fn indicator_pulse(mut self, pulse: Duration) -> Self {
        self.indicator_pulse = pulse;
        self
    }

    pub fn scan_staleness(mut self, window: Duration) -> Self {
        self.scan_staleness = window;
        self
    }

    /// Zero is raised to one so a tick always makes progress.
    pub fn max_requests_per_tick(mut self, max: usize) -> Self {
        self.max_requests_per_tick = max.max(1);
        self
    }

    pub fn request_queue_depth(mut self, depth: usize) -> Self {
        self.request_queue_depth = depth.max(1);
        self
    }

    pub fn notice_capacity(mut self, capacity: usize) -> Self {
        self.notice_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(10));
        assert_eq!(config.lock_pulse, Duration::from_millis(1000));
        assert_eq!(config.indicator_pulse, Duration::from_millis(2000));
        assert_eq!(config.scan_staleness, Duration::from_millis(30_000));
        assert_eq!(config.max_requests_per_tick, 16);
        assert_eq!(config.request_queue_depth, 64);
    }

    #[test]
    fn test_zero_bounds_are_raised() {
        let config = ControllerConfig::default()
            .max_requests_per_tick(0)
            .request_queue_depth(0)
            .notice_capacity(0);
        assert_eq!(config.max_requests_per_tick, 1);
        assert_eq!(config.request_queue_depth, 1);
        assert_eq!(config.notice_capacity, 1);
    }
}
