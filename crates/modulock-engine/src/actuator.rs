//! Timed actuator state.
//!
//! Each channel is a one-shot pulse: triggering it switches it on and sets a
//! deadline; [`ActuatorScheduler::advance`] switches it off once the deadline
//! has passed. A re-trigger replaces the deadline, so pulses never stack.
//! The scheduler only computes levels; the control loop writes them to the
//! hardware.

use std::time::{Duration, Instant};

use modulock_core::Channel;
use modulock_core::constants::MAX_PULSE_MS;
use tracing::trace;

use crate::config::ControllerConfig;

/// On/off state of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorTimer {
    pub active: bool,
    pub off_at: Option<Instant>,
}

/// Pulse timers for the lock and both indicators.
#[derive(Debug, Clone)]
pub struct ActuatorScheduler {
    timers: [ActuatorTimer; 3],
    lock_pulse: Duration,
    indicator_pulse: Duration,
}

impl ActuatorScheduler {
    /// Pulses longer than [`MAX_PULSE_MS`] are cut down to it.
    pub fn new(lock_pulse: Duration, indicator_pulse: Duration) -> Self {
        let max = Duration::from_millis(MAX_PULSE_MS);
        Self {
            timers: [ActuatorTimer::default(); 3],
            lock_pulse: lock_pulse.min(max),
            indicator_pulse: indicator_pulse.min(max),
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.lock_pulse, config.indicator_pulse)
    }

    /// Pulse length of `channel`.
    pub fn duration(&self, channel: Channel) -> Duration {
        match channel {
            Channel::Lock => self.lock_pulse,
            Channel::OkIndicator | Channel::AlertIndicator => self.indicator_pulse,
        }
    }

    /// Switch `channel` on until `now + duration(channel)`.
    ///
    /// Returns the new deadline. Any pending deadline is replaced.
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    /// use modulock_core::Channel;
    /// use modulock_engine::ActuatorScheduler;
    ///
    /// let mut actuators = ActuatorScheduler::new(Duration::from_millis(1000), Duration::from_millis(2000));
    /// let t0 = Instant::now();
    ///
    /// actuators.trigger(Channel::Lock, t0);
    /// actuators.advance(t0 + Duration::from_millis(999));
    /// assert!(actuators.is_active(Channel::Lock));
    ///
    /// actuators.advance(t0 + Duration::from_millis(1000));
    /// assert!(!actuators.is_active(Channel::Lock));
    /// ```
    pub fn trigger(&mut self, channel: Channel, now: Instant) -> Instant {
        let off_at = now.checked_add(self.duration(channel)).unwrap_or(now);
        let timer = &mut self.timers[channel.index()];
        timer.active = true;
        timer.off_at = Some(off_at);
        trace!(%channel, "actuator triggered");
        off_at
    }

    /// Deactivate every channel whose deadline is at or before `now`.
    ///
    /// Returns the channels switched off by this call.
    pub fn advance(&mut self, now: Instant) -> Vec<Channel> {
        let mut expired = Vec::new();
        for channel in Channel::ALL {
            let timer = &mut self.timers[channel.index()];
            if timer.off_at.is_some_and(|off_at| now >= off_at) {
                timer.active = false;
                timer.off_at = None;
                trace!(%channel, "actuator expired");
                expired.push(channel);
            }
        }
        expired
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.timers[channel.index()].active
    }

    /// Pending deadline of `channel`, if it is on.
    pub fn deadline(&self, channel: Channel) -> Option<Instant> {
        self.timers[channel.index()].off_at
    }

    pub fn timer(&self, channel: Channel) -> ActuatorTimer {
        self.timers[channel.index()]
    }
}

impl Default for ActuatorScheduler {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[rstest]
    #[case(Channel::Lock, 1000)]
    #[case(Channel::OkIndicator, 2000)]
    #[case(Channel::AlertIndicator, 2000)]
    fn test_pulse_boundary(#[case] channel: Channel, #[case] pulse: u64) {
        let mut actuators = ActuatorScheduler::default();
        let t0 = Instant::now();
        actuators.trigger(channel, t0);

        assert!(actuators.advance(t0 + ms(pulse - 1)).is_empty());
        assert!(actuators.is_active(channel));

        assert_eq!(actuators.advance(t0 + ms(pulse)), vec![channel]);
        assert!(!actuators.is_active(channel));
        assert_eq!(actuators.deadline(channel), None);
    }

    #[test]
    fn test_retrigger_resets_deadline() {
        let mut actuators = ActuatorScheduler::default();
        let t0 = Instant::now();
        actuators.trigger(Channel::Lock, t0);
        actuators.trigger(Channel::Lock, t0 + ms(600));

        actuators.advance(t0 + ms(1599));
        assert!(actuators.is_active(Channel::Lock));
        actuators.advance(t0 + ms(1600));
        assert!(!actuators.is_active(Channel::Lock));
    }

    #[test]
    fn test_channels_are_independent() {
        let mut actuators = ActuatorScheduler::default();
        let t0 = Instant::now();
        actuators.trigger(Channel::Lock, t0);
        actuators.trigger(Channel::OkIndicator, t0);

        assert_eq!(actuators.advance(t0 + ms(1000)), vec![Channel::Lock]);
        assert!(actuators.is_active(Channel::OkIndicator));
        assert!(!actuators.is_active(Channel::AlertIndicator));
    }

    #[test]
    fn test_oversized_pulse_is_capped() {
        let mut actuators = ActuatorScheduler::new(Duration::MAX, ms(u64::MAX));
        let max = ms(MAX_PULSE_MS);
        assert_eq!(actuators.duration(Channel::Lock), max);
        assert_eq!(actuators.duration(Channel::AlertIndicator), max);

        let t0 = Instant::now();
        assert_eq!(actuators.trigger(Channel::Lock, t0), t0 + max);
        assert!(actuators.advance(t0 + max - ms(1)).is_empty());
        assert_eq!(actuators.advance(t0 + max), vec![Channel::Lock]);
    }

    #[test]
    fn test_advance_idle_is_noop() {
        let mut actuators = ActuatorScheduler::default();
        assert!(actuators.advance(Instant::now()).is_empty());
        for channel in Channel::ALL {
            assert_eq!(actuators.timer(channel), ActuatorTimer::default());
        }
    }

    proptest! {
        #[test]
        fn active_exactly_until_deadline(
            first in 0u64..5000,
            gap in 0u64..5000,
            offset in 0u64..10_000,
        ) {
            let mut actuators = ActuatorScheduler::default();
            let t0 = Instant::now();
            let second = first + gap;

            actuators.trigger(Channel::Lock, t0 + ms(first));
            actuators.advance(t0 + ms(second.min(first + 999)));
            actuators.trigger(Channel::Lock, t0 + ms(second));

            let at = second + offset;
            actuators.advance(t0 + ms(at));
            prop_assert_eq!(actuators.is_active(Channel::Lock), at < second + 1000);
        }
    }
}
