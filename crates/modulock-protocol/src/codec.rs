//! Tokio codec for the text command console.
//!
//! `CommandLineCodec` frames newline-terminated command lines and parses
//! each one with [`CommandParser`]. Replies are written back as single
//! lines.
//!
//! # Framing
//!
//! - Lines end with `\n`; a trailing `\r` and surrounding whitespace are
//!   ignored.
//! - Blank lines are skipped.
//! - A line longer than the configured maximum is discarded up to its
//!   newline and reported as `Error::LineTooLong` *inside* the item, so a
//!   single bad line never tears the connection down.
//!
//! Decoded items are `Result<Command>`: a parse failure is data for the
//! caller to answer, not a stream error. The decoder's own error type is
//! reserved for I/O.
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//! use modulock_protocol::{Command, CommandLineCodec};
//!
//! let mut codec = CommandLineCodec::new();
//! let mut buffer = BytesMut::from(&b"OPEN DOOR\r\nGET US"[..]);
//!
//! assert_eq!(codec.decode(&mut buffer).unwrap().unwrap().unwrap(), Command::OpenDoor);
//! // Partial line: need more data
//! assert!(codec.decode(&mut buffer).unwrap().is_none());
//! ```

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{Command, CommandParser};
use modulock_core::{Error, Result, constants::DEFAULT_MAX_LINE_LENGTH};

/// Line codec producing parsed commands.
#[derive(Debug)]
pub struct CommandLineCodec {
    /// Maximum accepted line length in bytes, excluding the newline.
    max_line_length: usize,

    /// Offset up to which the buffer is known to contain no newline.
    next_index: usize,

    /// Whether we are dropping the tail of an over-long line.
    discarding: bool,
}

impl CommandLineCodec {
    /// Create a codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
            discarding: false,
        }
    }

    /// Get the current maximum line length.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    fn parse_line(&self, line: &[u8]) -> Option<Result<Command>> {
        if line.len() > self.max_line_length {
            return Some(Err(Error::LineTooLong {
                max: self.max_line_length,
            }));
        }
        let text = String::from_utf8_lossy(line);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(CommandParser::parse(text))
    }
}

impl Default for CommandLineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for CommandLineCodec {
    type Item = Result<Command>;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            let newline = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| offset + self.next_index);

            match (self.discarding, newline) {
                (true, Some(end)) => {
                    src.advance(end + 1);
                    self.discarding = false;
                    self.next_index = 0;
                    return Ok(Some(Err(Error::LineTooLong {
                        max: self.max_line_length,
                    })));
                }
                (true, None) => {
                    src.advance(src.len());
                    self.next_index = 0;
                    return Ok(None);
                }
                (false, Some(end)) => {
                    let line = src.split_to(end + 1);
                    self.next_index = 0;
                    match self.parse_line(&line[..end]) {
                        Some(item) => return Ok(Some(item)),
                        None => continue,
                    }
                }
                (false, None) => {
                    if src.len() > self.max_line_length {
                        self.discarding = true;
                        continue;
                    }
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        // Final line without a trailing newline
        self.next_index = 0;
        if self.discarding || src.is_empty() {
            self.discarding = false;
            src.clear();
            return Ok(None);
        }
        let line = src.split_to(src.len());
        Ok(self.parse_line(&line))
    }
}

impl Encoder<String> for CommandLineCodec {
    type Error = Error;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(item.len() + 1);
        dst.put_slice(item.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
