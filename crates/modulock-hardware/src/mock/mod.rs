//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod outputs;
pub mod reader;

pub use outputs::{MockOutputs, OutputProbe};
pub use reader::{MockReader, MockReaderHandle};
