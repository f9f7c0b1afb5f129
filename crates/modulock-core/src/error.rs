use std::fmt;

use thiserror::Error;

/// Which unique key of a credential caused a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    Ra,
    Uid,
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CredentialKey::Ra => write!(f, "RA"),
            CredentialKey::Uid => write!(f, "UID"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    // Roster errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {key} '{value}' is already registered")]
    Conflict { key: CredentialKey, value: String },

    #[error("Not found: no credential with RA '{ra}'")]
    NotFound { ra: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    // Command errors
    #[error("Parse error: {message}. {usage}")]
    Parse { message: String, usage: String },

    #[error("Authentication required")]
    Auth,

    // Controller errors
    #[error("Invalid scan state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Transport errors
    #[error("Line exceeds maximum length of {max} bytes")]
    LineTooLong { max: usize },

    #[error("Controller unavailable")]
    Unavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a validation error for an empty or malformed field.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a parse error carrying a usage hint for the caller.
    pub fn parse(message: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            usage: usage.into(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Coarse classification used by channels to pick a status code or prefix.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Persistence(_) => ErrorKind::Persistence,
            Error::Parse { .. } | Error::LineTooLong { .. } => ErrorKind::Parse,
            Error::Auth => ErrorKind::Auth,
            Error::Unavailable | Error::Io(_) | Error::InvalidStateTransition { .. } => {
                ErrorKind::Unavailable
            }
        }
    }
}

/// Error classes exposed to external channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Persistence,
    Parse,
    Auth,
    Unavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Parse => "parse",
            ErrorKind::Auth => "auth",
            ErrorKind::Unavailable => "unavailable",
        };
        write!(f, "{name}")
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display_names_key() {
        let error = Error::Conflict {
            key: CredentialKey::Uid,
            value: "AB12CD34".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Conflict: UID 'AB12CD34' is already registered"
        );
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_parse_error_includes_usage() {
        let error = Error::parse("expected 3 fields", "Use 'ADD USER RA,NAME,UID'");
        assert_eq!(
            error.to_string(),
            "Parse error: expected 3 fields. Use 'ADD USER RA,NAME,UID'"
        );
        assert_eq!(error.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let error: Error = io.into();
        assert!(matches!(error, Error::Io(_)));
        assert_eq!(error.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::Validation.to_string(), "validation");
    }
}
