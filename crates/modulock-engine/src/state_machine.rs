//! Scan cycle state machine.
//!
//! Every poll cycle that detects a card walks the machine from `Idle`
//! through `Detected` to a decision and back:
//!
//! - Idle → Detected
//! - Detected → Admitted | Denied
//! - Detected → Idle (card could not be read)
//! - Admitted → Idle
//! - Denied → Idle
//!
//! Nothing carries over between cycles except the transition history, which
//! is bounded and kept for diagnostics.
//!
//! # Examples
//!
//! ```
//! use std::time::Instant;
//! use modulock_engine::{ScanState, ScanStateMachine};
//!
//! let mut machine = ScanStateMachine::new();
//! let now = Instant::now();
//!
//! machine.transition_to(ScanState::Detected, now).unwrap();
//! machine.transition_to(ScanState::Denied, now).unwrap();
//! machine.transition_to(ScanState::Idle, now).unwrap();
//!
//! assert_eq!(machine.current_state(), ScanState::Idle);
//! assert_eq!(machine.history().len(), 3);
//! assert!(machine.transition_to(ScanState::Admitted, now).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use modulock_core::{Error, Result};

/// Maximum number of transitions kept in history.
///
/// A full cycle is three transitions, so this covers the last thirty-odd
/// scans.
const MAX_HISTORY_SIZE: usize = 100;

/// Phase of the current scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// No card in the field.
    Idle,

    /// A card was detected and is being read.
    Detected,

    /// The card is registered; lock and ok indicator were pulsed.
    Admitted,

    /// The card is unknown; the alert indicator was pulsed.
    Denied,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ScanState::Idle => "Idle",
            ScanState::Detected => "Detected",
            ScanState::Admitted => "Admitted",
            ScanState::Denied => "Denied",
        };
        write!(f, "{}", state_str)
    }
}

impl ScanState {
    /// Check if transition to `target` is valid from this state.
    ///
    /// ```
    /// use modulock_engine::ScanState;
    ///
    /// assert!(ScanState::Idle.can_transition_to(ScanState::Detected));
    /// assert!(!ScanState::Idle.can_transition_to(ScanState::Admitted));
    /// ```
    pub fn can_transition_to(self, target: ScanState) -> bool {
        matches!(
            (self, target),
            (ScanState::Idle, ScanState::Detected)
                | (
                    ScanState::Detected,
                    ScanState::Admitted | ScanState::Denied | ScanState::Idle
                )
                | (ScanState::Admitted, ScanState::Idle)
                | (ScanState::Denied, ScanState::Idle)
        )
    }

    /// Returns `true` for the two decision states.
    pub fn is_decision(self) -> bool {
        matches!(self, ScanState::Admitted | ScanState::Denied)
    }
}

/// A single recorded transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTransition {
    pub from: ScanState,
    pub to: ScanState,
    pub at: Instant,
}

/// Scan state machine with bounded history.
///
/// Not thread-safe; owned by the control loop.
#[derive(Debug, Clone)]
pub struct ScanStateMachine {
    current_state: ScanState,
    history: VecDeque<ScanTransition>,
    admitted: u64,
    denied: u64,
}

impl ScanStateMachine {
    pub fn new() -> Self {
        Self {
            current_state: ScanState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            admitted: 0,
            denied: 0,
        }
    }

    pub fn current_state(&self) -> ScanState {
        self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<ScanTransition> {
        &self.history
    }

    /// The last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<ScanTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Number of admitted scans since creation.
    pub fn admitted_count(&self) -> u64 {
        self.admitted
    }

    /// Number of denied scans since creation.
    pub fn denied_count(&self) -> u64 {
        self.denied
    }

    /// Transition to `new_state`, validating the move.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the move is not allowed
    /// from the current state; the machine is left unchanged.
    pub fn transition_to(&mut self, new_state: ScanState, now: Instant) -> Result<ScanTransition> {
        if !self.current_state.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = ScanTransition {
            from: self.current_state,
            to: new_state,
            at: now,
        };

        self.current_state = new_state;
        match new_state {
            ScanState::Admitted => self.admitted += 1,
            ScanState::Denied => self.denied += 1,
            _ => {}
        }

        if self.history.len() == MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition.clone());

        Ok(transition)
    }

    /// Force the machine back to `Idle` without recording a transition.
    pub fn reset(&mut self) {
        self.current_state = ScanState::Idle;
    }
}

impl Default for ScanStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
