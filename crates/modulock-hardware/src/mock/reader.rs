//! Mock card reader implementation for testing and development.
//!
//! This module provides a simulated proximity reader whose card taps are
//! injected through a [`MockReaderHandle`].

use crate::{HardwareError, Result, traits::CardReader};
use tokio::sync::mpsc;

/// Minimum UID length in bytes (per ISO 14443 specification).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum UID length in bytes (per ISO 14443 specification).
pub const MAX_UID_LENGTH: usize = 10;

/// Internal event type for mock reader.
#[derive(Debug, Clone)]
enum CardEvent {
    Presented(Vec<u8>),
    Faulty,
}

/// Mock card reader for testing and development.
///
/// Card taps queued through the handle are picked up one per detection
/// cycle. `detect()` never blocks: it only looks at already queued taps.
///
/// # Examples
///
/// ```
/// use modulock_hardware::mock::MockReader;
/// use modulock_hardware::traits::CardReader;
///
/// let (mut reader, handle) = MockReader::new();
/// assert!(!reader.detect());
///
/// handle.try_present(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
/// assert!(reader.detect());
/// assert_eq!(reader.read_id().unwrap(), vec![0x01, 0x02, 0x03, 0x04]);
/// reader.release();
/// ```
#[derive(Debug)]
pub struct MockReader {
    /// Channel receiver for card events
    event_rx: mpsc::Receiver<CardEvent>,

    /// Card currently in the field
    current: Option<CardEvent>,

    /// Number of completed detection cycles
    released: usize,
}

impl MockReader {
    /// Create a new mock reader and the handle that feeds it.
    pub fn new() -> (Self, MockReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx,
            current: None,
            released: 0,
        };

        (reader, MockReaderHandle { event_tx })
    }

    /// Number of times `release()` ended a detection cycle.
    pub fn release_count(&self) -> usize {
        self.released
    }
}

impl CardReader for MockReader {
    fn detect(&mut self) -> bool {
        if self.current.is_none() {
            self.current = self.event_rx.try_recv().ok();
        }
        self.current.is_some()
    }

    fn read_id(&mut self) -> Result<Vec<u8>> {
        match &self.current {
            Some(CardEvent::Presented(uid)) => Ok(uid.clone()),
            Some(CardEvent::Faulty) => Err(HardwareError::card_read("anticollision failed")),
            None => Err(HardwareError::card_read("no card in field")),
        }
    }

    fn release(&mut self) {
        if self.current.take().is_some() {
            self.released += 1;
        }
    }
}

/// Handle for presenting cards to a [`MockReader`].
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    event_tx: mpsc::Sender<CardEvent>,
}

impl MockReaderHandle {
    /// Present a card, waiting for queue space.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is outside 4-10 bytes or the
    /// reader has been dropped.
    pub async fn present(&self, uid: Vec<u8>) -> Result<()> {
        validate_uid_length(&uid)?;
        self.event_tx
            .send(CardEvent::Presented(uid))
            .await
            .map_err(|_| HardwareError::disconnected("mock reader event channel closed"))
    }

    /// Present a card from a thread outside the runtime, waiting for queue
    /// space.
    ///
    /// Must not be called from async code.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is outside 4-10 bytes or the
    /// reader has been dropped.
    pub fn blocking_present(&self, uid: Vec<u8>) -> Result<()> {
        validate_uid_length(&uid)?;
        self.event_tx
            .blocking_send(CardEvent::Presented(uid))
            .map_err(|_| HardwareError::disconnected("mock reader event channel closed"))
    }

    /// Present a card without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is invalid, the queue is full or
    /// the reader has been dropped.
    pub fn try_present(&self, uid: Vec<u8>) -> Result<()> {
        validate_uid_length(&uid)?;
        self.event_tx
            .try_send(CardEvent::Presented(uid))
            .map_err(|_| HardwareError::disconnected("mock reader event channel unavailable"))
    }

    /// Make the next detection cycle fail at `read_id()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue is full or the reader has been dropped.
    pub fn try_present_faulty(&self) -> Result<()> {
        self.event_tx
            .try_send(CardEvent::Faulty)
            .map_err(|_| HardwareError::disconnected("mock reader event channel unavailable"))
    }
}

fn validate_uid_length(uid: &[u8]) -> Result<()> {
    if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&uid.len()) {
        return Err(HardwareError::invalid_data(format!(
            "UID must be {MIN_UID_LENGTH}-{MAX_UID_LENGTH} bytes, got {}",
            uid.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_card_detected_when_idle() {
        let (mut reader, _handle) = MockReader::new();
        assert!(!reader.detect());
        assert!(reader.read_id().is_err());
    }

    #[test]
    fn test_present_and_read() {
        let (mut reader, handle) = MockReader::new();
        handle.try_present(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();

        assert!(reader.detect());
        // detect is stable until release
        assert!(reader.detect());
        assert_eq!(reader.read_id().unwrap(), vec![0x04, 0xAB, 0xCD, 0xEF]);

        reader.release();
        assert_eq!(reader.release_count(), 1);
        assert!(!reader.detect());
    }

    #[test]
    fn test_cards_read_in_order() {
        let (mut reader, handle) = MockReader::new();
        handle.try_present(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
        handle.try_present(vec![0x05, 0x06, 0x07, 0x08]).unwrap();

        assert!(reader.detect());
        assert_eq!(reader.read_id().unwrap()[0], 0x01);
        reader.release();

        assert!(reader.detect());
        assert_eq!(reader.read_id().unwrap()[0], 0x05);
        reader.release();
    }

    #[test]
    fn test_faulty_read() {
        let (mut reader, handle) = MockReader::new();
        handle.try_present_faulty().unwrap();

        assert!(reader.detect());
        let error = reader.read_id().unwrap_err();
        assert!(matches!(error, HardwareError::CardReadError { .. }));
        reader.release();
        assert!(!reader.detect());
    }

    #[test]
    fn test_uid_length_validated() {
        let (_reader, handle) = MockReader::new();
        assert!(handle.try_present(vec![0x01, 0x02]).is_err());
        assert!(handle.try_present(vec![0x00; 11]).is_err());
        assert!(handle.try_present(vec![0x00; 7]).is_ok());
    }

    #[tokio::test]
    async fn test_present_async() {
        let (mut reader, handle) = MockReader::new();
        handle.present(vec![0x0A, 0x0B, 0x0C, 0x0D]).await.unwrap();
        assert!(reader.detect());
    }

    #[test]
    fn test_present_after_reader_dropped() {
        let (reader, handle) = MockReader::new();
        drop(reader);
        let error = handle.try_present(vec![0x01, 0x02, 0x03, 0x04]).unwrap_err();
        assert!(matches!(error, HardwareError::Disconnected { .. }));
    }

    #[test]
    fn test_blocking_present_from_thread() {
        let (mut reader, handle) = MockReader::new();
        std::thread::spawn(move || handle.blocking_present(vec![0x01, 0x02, 0x03, 0x04]))
            .join()
            .unwrap()
            .unwrap();
        assert!(reader.detect());
        assert_eq!(reader.read_id().unwrap(), vec![0x01, 0x02, 0x03, 0x04]);
    }
}
