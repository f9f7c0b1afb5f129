//! Core constants for the ModuLock access controller.
//!
//! This module centralizes the timing windows, command keywords and wire
//! strings shared by the engine, the persistence layer and both command
//! channels.
//!
//! # Timing
//!
//! | Constant | Value | Meaning |
//! |----------|-------|---------|
//! | [`LOCK_PULSE_MS`] | 1000 | How long the lock stays released after a trigger |
//! | [`INDICATOR_PULSE_MS`] | 2000 | How long an indicator stays lit after a trigger |
//! | [`SCAN_STALENESS_MS`] | 30000 | How long a scanned UID is offered for registration |
//!
//! # Usage
//!
//! ```
//! use modulock_core::constants::*;
//! use std::time::Duration;
//!
//! let pulse = Duration::from_millis(LOCK_PULSE_MS);
//! assert_eq!(pulse.as_secs(), 1);
//! assert_eq!(NO_UID, "No UID");
//! ```

// ============================================================================
// Actuator Timing
// ============================================================================

/// Lock release duration in milliseconds.
pub const LOCK_PULSE_MS: u64 = 1000;

/// Indicator (ok/alert LED) flash duration in milliseconds.
pub const INDICATOR_PULSE_MS: u64 = 2000;

/// Longest accepted pulse for any output, in milliseconds (one hour).
pub const MAX_PULSE_MS: u64 = 3_600_000;

// ============================================================================
// Scan Session
// ============================================================================

/// Window after a scan during which the UID is offered to the
/// registration-assist query. A scan is stale once `now - observed_at`
/// reaches this value.
pub const SCAN_STALENESS_MS: u64 = 30_000;

/// Sentinel returned to external callers when no fresh scan is available.
pub const NO_UID: &str = "No UID";

// ============================================================================
// Control Loop
// ============================================================================

/// Default control loop tick in milliseconds.
///
/// This is the resolution of actuator deadlines and reader polling.
pub const DEFAULT_TICK_MS: u64 = 10;

/// Longest accepted control loop tick in milliseconds.
pub const MAX_TICK_MS: u64 = 1000;

/// Maximum number of queued channel requests applied in a single tick.
pub const DEFAULT_MAX_REQUESTS_PER_TICK: usize = 16;

/// Capacity of the request queue shared by all command channels.
pub const DEFAULT_REQUEST_QUEUE_DEPTH: usize = 64;

/// Capacity of the notice broadcast channel.
pub const DEFAULT_NOTICE_CAPACITY: usize = 32;

// ============================================================================
// Text Command Grammar
// ============================================================================

/// Keyword of the door opening command.
pub const CMD_OPEN_DOOR: &str = "OPEN DOOR";

/// Keyword of the registration command.
pub const CMD_ADD_USER: &str = "ADD USER";

/// Keyword of the removal command.
pub const CMD_REMOVE_USER: &str = "REMOVE USER";

/// Keyword of the roster listing command.
pub const CMD_GET_USERS: &str = "GET USERS";

/// Separator between the fields of `ADD USER`.
pub const FIELD_SEPARATOR: char = ',';

/// Usage hint for a malformed `ADD USER`.
pub const USAGE_ADD_USER: &str = "Use 'ADD USER RA,NAME,UID'";

/// Usage hint for a malformed `REMOVE USER`.
pub const USAGE_REMOVE_USER: &str = "Use 'REMOVE USER RA'";

/// Usage hint listing every supported command.
pub const USAGE_ALL: &str =
    "Commands: OPEN DOOR, ADD USER RA,NAME,UID, REMOVE USER RA, GET USERS";

/// Default maximum length of a text command line in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 256;

// ============================================================================
// Persistence
// ============================================================================

/// Name of the array field holding the roster in the persisted document.
pub const ROSTER_FIELD: &str = "users";

/// Default roster document path.
pub const DEFAULT_ROSTER_PATH: &str = "users.json";
