//! Activity notices published by the control loop.

use std::fmt;

use chrono::{DateTime, Utc};
use modulock_core::Uid;
use modulock_protocol::Origin;
use serde::Serialize;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NoticeKind {
    /// A registered card was scanned and the door released.
    ScanAdmitted { name: String, uid: Uid },

    /// An unknown card was scanned.
    ScanDenied { uid: Uid },

    /// An administrator opened the door through a channel.
    DoorOpened { origin: Origin },
}

/// Timestamped activity record, broadcast to every console session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            kind,
            at: Utc::now(),
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::ScanAdmitted { name, .. } => {
                write!(f, "RFID: Authorized - door opened for {name}")
            }
            NoticeKind::ScanDenied { uid } => write!(f, "RFID: Not authorized ({uid})"),
            NoticeKind::DoorOpened { origin } => write!(f, "{origin}: Door opened"),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.kind)
    }
}
