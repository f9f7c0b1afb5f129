use crate::{Result, constants::ROSTER_FIELD, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration number, the primary key of a credential.
///
/// Surrounding whitespace is trimmed; the value must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ra(String);

impl Ra {
    /// Create a new RA with validation.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the RA is empty after trimming.
    pub fn new(ra: &str) -> Result<Self> {
        let ra = ra.trim();
        if ra.is_empty() {
            return Err(Error::validation("RA must not be empty"));
        }
        Ok(Ra(ra.to_string()))
    }

    /// Get the RA as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ra {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Ra {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ra::new(s)
    }
}

impl TryFrom<String> for Ra {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Ra::new(&value)
    }
}

impl From<Ra> for String {
    fn from(ra: Ra) -> Self {
        ra.0
    }
}

/// Canonical card identifier.
///
/// The canonical form is uppercase hexadecimal with two digits per raw
/// byte, zero-padded. Text input is trimmed and uppercased so any
/// mixed-case rendering of the same identifier compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Canonicalize raw identifier bytes read from a card.
    ///
    /// # Errors
    /// Returns `Error::Validation` if `raw` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use modulock_core::Uid;
    ///
    /// let uid = Uid::from_bytes(&[0x04, 0xab, 0x0c, 0xef]).unwrap();
    /// assert_eq!(uid.as_str(), "04AB0CEF");
    /// ```
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::validation("UID must not be empty"));
        }
        Ok(Uid(raw.iter().map(|b| format!("{b:02X}")).collect()))
    }

    /// Canonicalize a textual identifier.
    ///
    /// Idempotent: parsing an already canonical UID yields the same value.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the text is empty after trimming.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation("UID must not be empty"));
        }
        Ok(Uid(text.to_uppercase()))
    }

    /// Get the canonical UID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Uid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uid::parse(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Uid::parse(&value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

/// A registered credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credential {
    pub ra: Ra,
    pub name: String,
    pub uid: Uid,
}

impl Credential {
    /// Build a credential from raw text fields.
    ///
    /// # Errors
    /// Returns `Error::Validation` if `ra` or `uid` is empty.
    pub fn new(ra: &str, name: &str, uid: &str) -> Result<Self> {
        Ok(Self {
            ra: Ra::new(ra)?,
            name: name.trim().to_string(),
            uid: Uid::parse(uid)?,
        })
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (RA: {}, UID: {})", self.name, self.ra, self.uid)
    }
}

/// Persisted roster document: a single object with one array field.
///
/// ```json
/// {"users":[{"ra":"R1","name":"Alice","uid":"AB12CD34"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterDocument {
    pub users: Vec<Credential>,
}

impl RosterDocument {
    /// Name of the array field, for diagnostics.
    pub const FIELD: &'static str = ROSTER_FIELD;

    pub fn new(users: Vec<Credential>) -> Self {
        Self { users }
    }
}

/// Timed actuator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Door lock relay.
    Lock,
    /// Green "access granted" indicator.
    OkIndicator,
    /// Red "access denied" indicator.
    AlertIndicator,
}

impl Channel {
    /// Every channel, in a fixed order.
    pub const ALL: [Channel; 3] = [Channel::Lock, Channel::OkIndicator, Channel::AlertIndicator];

    /// Index into per-channel arrays.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Channel::Lock => 0,
            Channel::OkIndicator => 1,
            Channel::AlertIndicator => 2,
        }
    }

    /// Returns `true` for the two indicator channels.
    #[inline]
    #[must_use]
    pub fn is_indicator(self) -> bool {
        !matches!(self, Channel::Lock)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Channel::Lock => write!(f, "lock"),
            Channel::OkIndicator => write!(f, "ok_indicator"),
            Channel::AlertIndicator => write!(f, "alert_indicator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0x01, 0x02, 0x03, 0x04], "01020304")]
    #[case(&[0xab, 0x12, 0xcd, 0x34], "AB12CD34")]
    #[case(&[0x00], "00")]
    #[case(&[0x0f, 0xf0, 0x00, 0xff, 0x10, 0x01, 0x99], "0FF000FF100199")]
    fn test_uid_from_bytes(#[case] raw: &[u8], #[case] expected: &str) {
        assert_eq!(Uid::from_bytes(raw).unwrap().as_str(), expected);
    }

    #[test]
    fn test_uid_from_empty_bytes_rejected() {
        assert!(matches!(Uid::from_bytes(&[]), Err(Error::Validation(_))));
    }

    #[rstest]
    #[case("ab12cd34")]
    #[case("AB12cd34")]
    #[case("  Ab12Cd34 ")]
    fn test_uid_parse_is_case_insensitive(#[case] text: &str) {
        assert_eq!(Uid::parse(text).unwrap().as_str(), "AB12CD34");
    }

    #[test]
    fn test_uid_parse_empty_rejected() {
        assert!(Uid::parse("").is_err());
        assert!(Uid::parse("   ").is_err());
    }

    #[test]
    fn test_ra_trimmed_and_validated() {
        assert_eq!(Ra::new(" R1 ").unwrap().as_str(), "R1");
        assert!(matches!(Ra::new(""), Err(Error::Validation(_))));
    }

    #[test]
    fn test_credential_new_validates_keys() {
        assert!(Credential::new("R1", "Alice", "ab12").is_ok());
        assert!(Credential::new("", "Alice", "ab12").is_err());
        assert!(Credential::new("R1", "Alice", "").is_err());
        // name may be empty
        assert!(Credential::new("R1", "", "ab12").is_ok());
    }

    #[test]
    fn test_roster_document_shape() {
        let doc = RosterDocument::new(vec![Credential::new("R1", "Alice", "ab12cd34").unwrap()]);
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"users":[{"ra":"R1","name":"Alice","uid":"AB12CD34"}]}"#);
    }

    #[test]
    fn test_roster_document_rejects_empty_uid() {
        let json = r#"{"users":[{"ra":"R1","name":"Alice","uid":""}]}"#;
        assert!(serde_json::from_str::<RosterDocument>(json).is_err());
    }

    #[test]
    fn test_roster_document_rejects_unknown_shape() {
        assert!(serde_json::from_str::<RosterDocument>(r#"{"people":[]}"#).is_err());
        assert!(serde_json::from_str::<RosterDocument>(r#"{"users":{}}"#).is_err());
    }

    #[test]
    fn test_channel_index_matches_all() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
        assert!(!Channel::Lock.is_indicator());
        assert!(Channel::AlertIndicator.is_indicator());
    }

    proptest! {
        #[test]
        fn prop_uid_parse_idempotent(text in "[0-9a-fA-F]{2,20}") {
            let once = Uid::parse(&text).unwrap();
            let twice = Uid::parse(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_uid_bytes_match_text(raw in proptest::collection::vec(any::<u8>(), 1..10)) {
            let from_bytes = Uid::from_bytes(&raw).unwrap();
            prop_assert_eq!(from_bytes.as_str().len(), raw.len() * 2);
            let lower = from_bytes.as_str().to_lowercase();
            prop_assert_eq!(Uid::parse(&lower).unwrap(), from_bytes);
        }
    }
}
