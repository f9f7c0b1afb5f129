//! Command results and their plain-text rendering.

use modulock_core::{Credential, Ra, Result, RosterDocument};

/// Successful outcome of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    DoorOpened,
    UserAdded(Credential),
    UserRemoved(Ra),
    Roster(RosterDocument),
}

impl Reply {
    /// Serialize a roster snapshot as the persisted document shape.
    ///
    /// # Errors
    ///
    /// Returns `Error::Persistence` if serialization fails.
    pub fn roster_json(roster: &RosterDocument) -> Result<String> {
        serde_json::to_string(roster)
            .map_err(|e| modulock_core::Error::persistence(format!("roster serialization: {e}")))
    }
}

/// Render a command result as a single console line.
///
/// Success lines start with `OK:`, failures with `ERR:` followed by the
/// specific reason.
///
/// ```
/// use modulock_protocol::{Reply, render_text};
///
/// assert_eq!(render_text(&Ok(Reply::DoorOpened)), "OK: Door opened");
/// ```
pub fn render_text(result: &Result<Reply>) -> String {
    match result {
        Ok(Reply::DoorOpened) => "OK: Door opened".to_string(),
        Ok(Reply::UserAdded(credential)) => format!(
            "OK: User {} (RA: {}) added with UID {}",
            credential.name, credential.ra, credential.uid
        ),
        Ok(Reply::UserRemoved(ra)) => format!("OK: User with RA '{ra}' removed"),
        Ok(Reply::Roster(roster)) => match Reply::roster_json(roster) {
            Ok(json) => format!("OK: Registered users: {json}"),
            Err(e) => format!("ERR: {e}"),
        },
        Err(e) => format!("ERR: {e}"),
    }
}
