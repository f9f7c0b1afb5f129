//! Card taps typed on standard input.
//!
//! Each line is a hex UID such as `04A10BFF`, `04:a1:0b:ff` or `04 A1 0B FF`.
//! Lines are read on a plain OS thread: a blocked read there never holds up
//! runtime shutdown.

use std::io::BufRead;
use std::thread;

use modulock_core::{Error, Result};
use modulock_hardware::HardwareError;
use modulock_hardware::mock::MockReaderHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Decode a typed UID into raw bytes.
pub fn parse_hex_uid(line: &str) -> Result<Vec<u8>> {
    let digits: String = line
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | ' ' | '\t'))
        .collect();

    if digits.is_empty() {
        return Err(Error::validation("UID must not be empty"));
    }

    hex::decode(&digits).map_err(|e| Error::validation(format!("'{}': {e}", line.trim())))
}

/// Start a detached thread presenting each UID line of `input` as a card tap.
///
/// The thread stops at EOF, once `shutdown` is cancelled, or when the reader
/// is gone. Nothing waits for it on exit.
pub fn spawn_reader<R>(
    input: R,
    cards: MockReaderHandle,
    shutdown: CancellationToken,
) -> std::io::Result<thread::JoinHandle<usize>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("modulock-stdin".to_string())
        .spawn(move || feed_lines(input, &cards, &shutdown))
}

/// Present every UID line of `input`, returning how many taps were accepted.
pub fn feed_lines(input: impl BufRead, cards: &MockReaderHandle, shutdown: &CancellationToken) -> usize {
    info!("Type a card UID in hex and press Enter to simulate a tap");
    let mut presented = 0;

    for line in input.lines() {
        if shutdown.is_cancelled() {
            break;
        }

        let line = match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read standard input");
                return presented;
            }
        };

        match parse_hex_uid(&line) {
            Ok(uid) => match cards.blocking_present(uid) {
                Ok(()) => presented += 1,
                Err(HardwareError::Disconnected { .. }) => {
                    debug!("Reader gone, simulated input stopped");
                    return presented;
                }
                Err(e) => warn!(error = %e, "Simulated tap rejected"),
            },
            Err(e) => warn!(error = %e, "Ignoring input"),
        }
    }

    debug!(presented, "Simulated reader input finished");
    presented
}
