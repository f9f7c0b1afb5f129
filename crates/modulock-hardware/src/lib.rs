//! Hardware collaborators for the ModuLock access controller.
//!
//! This crate defines the two peripheral seams of the controller:
//!
//! - [`CardReader`]: a proximity card reader exposing non-blocking
//!   `detect()`, `read_id()` and `release()`.
//! - [`ActuatorOutputs`]: the lock relay and indicator outputs.
//!
//! The [`mock`] module provides programmable implementations for
//! development and tests.
//!
//! Both traits are object-safe, so the control loop holds them as
//! `Box<dyn CardReader>` and `Box<dyn ActuatorOutputs>`.
//!
//! [`CardReader`]: traits::CardReader
//! [`ActuatorOutputs`]: traits::ActuatorOutputs

pub mod error;
pub mod mock;
pub mod traits;

pub use error::{HardwareError, Result};
pub use traits::{ActuatorOutputs, CardReader};
