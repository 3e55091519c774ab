//! Zone code utilities.
//!
//! A zone code is a five-digit ZCTA (zip code tabulation area) identifier.
//! The same codes scope both the incident query (`incident_zip`) and the
//! zone polygon filter (`zcta`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Zone codes around The New School in lower/midtown Manhattan.
pub const DEFAULT_ZONE_CODES: &[&str] = &[
    "10001", "10003", "10010", "10011", "10012", "10014", "10016", "10018", "10019", "10036",
    "10199",
];

/// Number of digits in a ZCTA code.
const ZONE_CODE_LEN: usize = 5;

/// Error returned when a zone code or zone set fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneCodeError {
    /// The code was an empty string.
    Empty,
    /// The code was not exactly five ASCII digits.
    InvalidFormat {
        /// The rejected code.
        code: String,
    },
    /// A zone set was built from no codes at all.
    EmptySet,
}

impl fmt::Display for ZoneCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "zone code is empty"),
            Self::InvalidFormat { code } => {
                write!(f, "invalid zone code {code:?}: expected {ZONE_CODE_LEN} digits")
            }
            Self::EmptySet => write!(f, "zone set must contain at least one code"),
        }
    }
}

impl std::error::Error for ZoneCodeError {}

/// A validated five-digit zone code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneCode(String);

impl ZoneCode {
    /// Validates and wraps a zone code.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneCodeError`] if the code is empty or is not exactly
    /// five ASCII digits.
    pub fn new(code: &str) -> Result<Self, ZoneCodeError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ZoneCodeError::Empty);
        }
        if code.len() != ZONE_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ZoneCodeError::InvalidFormat {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZoneCode {
    type Err = ZoneCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ZoneCode {
    type Error = ZoneCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ZoneCode> for String {
    fn from(code: ZoneCode) -> Self {
        code.0
    }
}

/// A non-empty, insertion-ordered set of zone codes.
///
/// Duplicates are collapsed, keeping the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AllowedZones {
    codes: Vec<ZoneCode>,
}

impl AllowedZones {
    /// Builds a zone set from already-validated codes.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneCodeError::EmptySet`] if `codes` yields nothing.
    pub fn new(codes: impl IntoIterator<Item = ZoneCode>) -> Result<Self, ZoneCodeError> {
        let mut unique: Vec<ZoneCode> = Vec::new();
        for code in codes {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }
        if unique.is_empty() {
            return Err(ZoneCodeError::EmptySet);
        }
        Ok(Self { codes: unique })
    }

    /// Parses and validates every code, then builds the set.
    ///
    /// # Errors
    ///
    /// Returns the first [`ZoneCodeError`] encountered, or
    /// [`ZoneCodeError::EmptySet`] if there are no codes.
    pub fn parse<S: AsRef<str>>(codes: &[S]) -> Result<Self, ZoneCodeError> {
        let codes = codes
            .iter()
            .map(|c| ZoneCode::new(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(codes)
    }

    /// Returns whether `code` is a member of this set.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.as_str() == code)
    }

    /// Iterates the codes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ZoneCode> {
        self.codes.iter()
    }

    /// Number of codes in the set. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Always `false`; present for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for AllowedZones {
    fn default() -> Self {
        Self {
            codes: DEFAULT_ZONE_CODES
                .iter()
                .map(|c| ZoneCode((*c).to_string()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AllowedZones {
    type Item = &'a ZoneCode;
    type IntoIter = std::slice::Iter<'a, ZoneCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<String>> for AllowedZones {
    type Error = ZoneCodeError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AllowedZones> for Vec<String> {
    fn from(zones: AllowedZones) -> Self {
        zones.codes.into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_codes_are_valid() {
        for code in DEFAULT_ZONE_CODES {
            assert!(ZoneCode::new(code).is_ok(), "invalid default code: {code}");
        }
        assert_eq!(AllowedZones::default().len(), DEFAULT_ZONE_CODES.len());
    }

    #[test]
    fn rejects_bad_codes() {
        assert_eq!(ZoneCode::new(""), Err(ZoneCodeError::Empty));
        assert_eq!(ZoneCode::new("   "), Err(ZoneCodeError::Empty));
        assert!(matches!(
            ZoneCode::new("1001"),
            Err(ZoneCodeError::InvalidFormat { .. })
        ));
        assert!(matches!(
            ZoneCode::new("10O01"),
            Err(ZoneCodeError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(ZoneCode::new(" 10001 ").unwrap().as_str(), "10001");
    }

    #[test]
    fn empty_set_is_rejected() {
        let empty: &[&str] = &[];
        assert_eq!(AllowedZones::parse(empty), Err(ZoneCodeError::EmptySet));
    }

    #[test]
    fn set_keeps_order_and_collapses_duplicates() {
        let zones = AllowedZones::parse(&["10012", "10001", "10012", "10003"]).unwrap();
        let codes: Vec<&str> = zones.iter().map(ZoneCode::as_str).collect();
        assert_eq!(codes, vec!["10012", "10001", "10003"]);
        assert!(zones.contains("10001"));
        assert!(!zones.contains("10002"));
    }

    #[test]
    fn deserializes_from_string_list() {
        let zones: AllowedZones = serde_json::from_str(r#"["10001", "10003"]"#).unwrap();
        assert_eq!(zones.len(), 2);

        let bad: Result<AllowedZones, _> = serde_json::from_str(r#"["10001", "abc"]"#);
        assert!(bad.is_err());
    }
}
