//! Command protocol shared by the ModuLock command channels.
//!
//! Both the HTTP interface and the text console funnel into the same typed
//! [`Command`] set. This crate owns that set, the textual grammar that
//! produces it ([`CommandParser`]), the newline framing of the console
//! ([`CommandLineCodec`]) and the plain-text rendering of results
//! ([`render_text`]).
//!
//! ```
//! use modulock_protocol::{Command, CommandParser};
//!
//! let command = CommandParser::parse("add user R1,Alice,ab12cd34").unwrap();
//! assert_eq!(
//!     command,
//!     Command::AddUser {
//!         ra: "R1".to_string(),
//!         name: "Alice".to_string(),
//!         uid: "ab12cd34".to_string(),
//!     }
//! );
//! ```

pub mod codec;
pub mod commands;
pub mod parser;
pub mod response;

pub use codec::CommandLineCodec;
pub use commands::{Command, CommandKind, Origin};
pub use parser::CommandParser;
pub use response::{Reply, render_text};
