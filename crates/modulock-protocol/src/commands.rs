//! Typed command set.

use modulock_core::constants::{CMD_ADD_USER, CMD_GET_USERS, CMD_OPEN_DOOR, CMD_REMOVE_USER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative command, independent of the channel it arrived on.
///
/// Argument fields carry the caller's text as-is (trimmed); key validation
/// happens in the credential store so both channels report the same
/// `Validation` error for an empty RA or UID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Release the lock and flash the ok indicator.
    OpenDoor,

    /// Register a credential.
    AddUser { ra: String, name: String, uid: String },

    /// Remove the credential with the given RA.
    RemoveUser { ra: String },

    /// Snapshot the roster.
    GetUsers,
}

impl Command {
    /// The command's kind, without arguments.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::OpenDoor => CommandKind::OpenDoor,
            Command::AddUser { .. } => CommandKind::AddUser,
            Command::RemoveUser { .. } => CommandKind::RemoveUser,
            Command::GetUsers => CommandKind::GetUsers,
        }
    }

    /// Returns `true` if the command mutates the roster.
    #[must_use]
    pub fn mutates_roster(&self) -> bool {
        matches!(self, Command::AddUser { .. } | Command::RemoveUser { .. })
    }
}

/// Command discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    OpenDoor,
    AddUser,
    RemoveUser,
    GetUsers,
}

impl CommandKind {
    /// Canonical text keyword of this command.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            CommandKind::OpenDoor => CMD_OPEN_DOOR,
            CommandKind::AddUser => CMD_ADD_USER,
            CommandKind::RemoveUser => CMD_REMOVE_USER,
            CommandKind::GetUsers => CMD_GET_USERS,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Channel a command arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// HTTP interface.
    Web,
    /// Text command console.
    Console,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Web => write!(f, "Web"),
            Origin::Console => write!(f, "Console"),
        }
    }
}
