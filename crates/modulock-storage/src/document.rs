//! Roster document encoding.
//!
//! The persisted roster is a single JSON object with one `users` array of
//! `{ra, name, uid}` records. Encoding and decoding are pure functions;
//! decoding enforces the schema and the roster's uniqueness invariants, so
//! anything it accepts can be served as-is.

use std::collections::HashSet;

use crate::error::{StorageError, StorageResult};
use modulock_core::RosterDocument;

/// Serialize a roster to its persisted form.
pub fn encode(roster: &RosterDocument) -> StorageResult<String> {
    Ok(serde_json::to_string(roster)?)
}

/// Parse a persisted roster.
///
/// # Errors
///
/// Returns `StorageError::Json` for malformed JSON or an unexpected shape,
/// and `StorageError::Schema` if two records share an RA or a UID.
pub fn decode(text: &str) -> StorageResult<RosterDocument> {
    let roster: RosterDocument = serde_json::from_str(text)?;

    let mut ras = HashSet::new();
    let mut uids = HashSet::new();
    for credential in &roster.users {
        if !ras.insert(credential.ra.as_str()) {
            return Err(StorageError::Schema(format!(
                "duplicate RA '{}'",
                credential.ra
            )));
        }
        if !uids.insert(credential.uid.as_str()) {
            return Err(StorageError::Schema(format!(
                "duplicate UID '{}'",
                credential.uid
            )));
        }
    }

    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modulock_core::Credential;
    use rstest::rstest;

    #[test]
    fn test_encode_decode_preserves_order() {
        let roster = RosterDocument::new(vec![
            Credential::new("R2", "Bob", "FF00FF00").unwrap(),
            Credential::new("R1", "Alice", "AB12CD34").unwrap(),
        ]);
        let text = encode(&roster).unwrap();
        assert_eq!(decode(&text).unwrap(), roster);
    }

    #[test]
    fn test_decode_canonicalizes_uid() {
        let roster = decode(r#"{"users":[{"ra":"R1","name":"Alice","uid":"ab12cd34"}]}"#).unwrap();
        assert_eq!(roster.users[0].uid.as_str(), "AB12CD34");
    }

    #[test]
    fn test_decode_empty_roster() {
        assert!(decode(r#"{"users":[]}"#).unwrap().users.is_empty());
    }

    #[rstest]
    #[case("")]
    #[case("not json")]
    #[case("[]")]
    #[case(r#"{"users":null}"#)]
    #[case(r#"{"users":[{"ra":"R1","name":"Alice"}]}"#)]
    #[case(r#"{"users":[{"ra":"","name":"Alice","uid":"AB"}]}"#)]
    #[case(r#"{"users":[],"extra":1}"#)]
    fn test_decode_rejects_malformed(#[case] text: &str) {
        assert!(matches!(decode(text), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_decode_rejects_duplicate_keys() {
        let dup_ra = r#"{"users":[{"ra":"R1","name":"A","uid":"01"},{"ra":"R1","name":"B","uid":"02"}]}"#;
        assert!(matches!(decode(dup_ra), Err(StorageError::Schema(_))));

        let dup_uid = r#"{"users":[{"ra":"R1","name":"A","uid":"0a"},{"ra":"R2","name":"B","uid":"0A"}]}"#;
        assert!(matches!(decode(dup_uid), Err(StorageError::Schema(_))));
    }
}
