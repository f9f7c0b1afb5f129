//! Hardware collaborator trait definitions.
//!
//! These traits establish the contract between the control loop and the
//! physical peripherals: a proximity card reader and the actuator outputs
//! (lock relay and two indicator LEDs).
//!
//! Unlike a typical async driver, every method here is synchronous and must
//! return promptly. The control loop polls the reader once per tick, so a
//! reader implementation has to be structured as check-then-read, never
//! wait-for-card.

use crate::error::Result;
use modulock_core::Channel;

/// Proximity card reader.
///
/// One detection cycle is `detect()`, then `read_id()` if a card was
/// detected, then `release()` to halt the card so the same tap is not
/// reported twice.
///
/// # Examples
///
/// ```
/// use modulock_hardware::mock::MockReader;
/// use modulock_hardware::traits::CardReader;
///
/// let (mut reader, handle) = MockReader::new();
/// handle.try_present(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
///
/// assert!(reader.detect());
/// let uid = reader.read_id().unwrap();
/// reader.release();
/// assert_eq!(uid, vec![0x04, 0xAB, 0xCD, 0xEF]);
/// assert!(!reader.detect());
/// ```
pub trait CardReader: Send {
    /// Check whether a new card is in the field. Must not block.
    fn detect(&mut self) -> bool;

    /// Read the raw identifier of the detected card.
    ///
    /// # Errors
    ///
    /// Returns an error if no card is present or the read fails.
    fn read_id(&mut self) -> Result<Vec<u8>>;

    /// Halt the current card and end the detection cycle.
    fn release(&mut self);
}

/// Sink for actuator output levels.
///
/// The control loop calls `set` only when a channel changes state.
pub trait ActuatorOutputs: Send {
    /// Drive `channel` active (`true`) or idle (`false`).
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be written.
    fn set(&mut self, channel: Channel, active: bool) -> Result<()>;
}

impl<T: CardReader + ?Sized> CardReader for Box<T> {
    fn detect(&mut self) -> bool {
        (**self).detect()
    }

    fn read_id(&mut self) -> Result<Vec<u8>> {
        (**self).read_id()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<T: ActuatorOutputs + ?Sized> ActuatorOutputs for Box<T> {
    fn set(&mut self, channel: Channel, active: bool) -> Result<()> {
        (**self).set(channel, active)
    }
}
