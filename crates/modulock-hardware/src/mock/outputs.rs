//! Mock actuator outputs.
//!
//! [`MockOutputs`] records every level change so tests can observe what the
//! control loop drove, through an [`OutputProbe`] that stays valid after the
//! outputs are moved into the controller.

use crate::{HardwareError, Result, traits::ActuatorOutputs};
use modulock_core::Channel;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Default)]
struct OutputState {
    levels: [bool; 3],
    writes: Vec<(Channel, bool)>,
}

/// Simulated lock relay and indicator LEDs.
#[derive(Debug, Clone, Default)]
pub struct MockOutputs {
    state: Arc<Mutex<OutputState>>,
}

impl MockOutputs {
    /// Create outputs with every channel idle.
    pub fn new() -> (Self, OutputProbe) {
        let outputs = Self::default();
        let probe = OutputProbe {
            state: outputs.state.clone(),
        };
        (outputs, probe)
    }
}

impl ActuatorOutputs for MockOutputs {
    fn set(&mut self, channel: Channel, active: bool) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| HardwareError::communication("output state poisoned"))?;
        state.levels[channel.index()] = active;
        state.writes.push((channel, active));
        info!(%channel, active, "output changed");
        Ok(())
    }
}

/// Read-only view of a [`MockOutputs`].
#[derive(Debug, Clone)]
pub struct OutputProbe {
    state: Arc<Mutex<OutputState>>,
}

impl OutputProbe {
    fn state(&self) -> MutexGuard<'_, OutputState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current level of `channel`.
    pub fn is_active(&self, channel: Channel) -> bool {
        self.state().levels[channel.index()]
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<(Channel, bool)> {
        self.state().writes.clone()
    }

    /// Whether `channel` was ever driven active.
    pub fn was_activated(&self, channel: Channel) -> bool {
        self.state().writes.iter().any(|&(c, active)| c == channel && active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outputs_start_idle() {
        let (_outputs, probe) = MockOutputs::new();
        for channel in Channel::ALL {
            assert!(!probe.is_active(channel));
        }
        assert!(probe.writes().is_empty());
    }

    #[test]
    fn test_probe_sees_writes() {
        let (mut outputs, probe) = MockOutputs::new();
        outputs.set(Channel::Lock, true).unwrap();
        outputs.set(Channel::OkIndicator, true).unwrap();
        outputs.set(Channel::Lock, false).unwrap();

        assert!(!probe.is_active(Channel::Lock));
        assert!(probe.is_active(Channel::OkIndicator));
        assert!(probe.was_activated(Channel::Lock));
        assert!(!probe.was_activated(Channel::AlertIndicator));
        assert_eq!(probe.writes().len(), 3);
    }

    #[test]
    fn test_boxed_outputs() {
        let (outputs, probe) = MockOutputs::new();
        let mut boxed: Box<dyn ActuatorOutputs> = Box::new(outputs);
        boxed.set(Channel::AlertIndicator, true).unwrap();
        assert!(probe.is_active(Channel::AlertIndicator));
    }
}
