//! Authorization and actuation engine of the modulock access controller.
//!
//! The engine is a single-writer poll loop. [`Controller`] owns the
//! credential roster, the last scan and the actuator timers; the web and
//! console front-ends reach it only through a [`ControllerHandle`], which
//! enqueues requests that the loop applies between reader polls.
//!
//! # Components
//!
//! - [`ActuatorScheduler`] - non-stacking pulse timers for the lock and the
//!   two indicators
//! - [`ScanSession`] - last scanned UID with a staleness window
//! - [`AuthorizationEngine`] - admit/deny lookup against the roster
//! - [`CommandDispatcher`] - applies `OPEN DOOR`, `ADD USER`, `REMOVE USER`
//!   and `GET USERS`
//! - [`ScanStateMachine`] - `Idle → Detected → Admitted/Denied → Idle`
//!
//! # Examples
//!
//! ```
//! use std::time::Instant;
//! use modulock_core::Channel;
//! use modulock_engine::{Controller, ControllerConfig};
//! use modulock_hardware::mock::{MockOutputs, MockReader};
//! use modulock_storage::{CredentialStore, MemoryBackend};
//!
//! let mut store = CredentialStore::new(MemoryBackend::new());
//! store.add("R1", "Alice", "AB12CD34").unwrap();
//!
//! let (reader, cards) = MockReader::new();
//! let (outputs, probe) = MockOutputs::new();
//! let (mut controller, _handle) =
//!     Controller::new(ControllerConfig::default(), store, reader, outputs);
//!
//! cards.try_present(vec![0xAB, 0x12, 0xCD, 0x34]).unwrap();
//! controller.step(Instant::now());
//!
//! assert!(probe.is_active(Channel::Lock));
//! ```

pub mod actuator;
pub mod authorization;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod notice;
pub mod scan_session;
pub mod state_machine;

pub use actuator::{ActuatorScheduler, ActuatorTimer};
pub use authorization::{AuthorizationEngine, Decision};
pub use config::ControllerConfig;
pub use controller::{ControlRequest, Controller, ControllerHandle, StepReport};
pub use dispatcher::CommandDispatcher;
pub use notice::{Notice, NoticeKind};
pub use scan_session::{ScanEvent, ScanSession};
pub use state_machine::{ScanState, ScanStateMachine, ScanTransition};
