use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX_LEN: usize = 4;
const DIGIT_COUNT: usize = 7;

/// Postal code in canonical `DDDD-DDD` form.
///
/// Only obtainable through [`NormalizedPostalCode::parse`], so every value
/// holds exactly seven ASCII digits with a hyphen after the fourth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedPostalCode(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    WrongLength(usize),
    NonDigit,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::WrongLength(len) => {
                write!(f, "expected {} digits, got {} characters", DIGIT_COUNT, len)
            }
            RejectReason::NonDigit => write!(f, "contains non-digit characters"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid postal code '{raw}': {reason}")]
pub struct RejectedFormat {
    pub raw: String,
    pub reason: RejectReason,
}

impl NormalizedPostalCode {
    /// Normalizes `"1000000"`, `"1000-000"` and `" 1000-000 "` alike to `1000-000`.
    ///
    /// Hyphens are dropped wherever they appear; what is left must be seven digits.
    pub fn parse(raw: &str) -> Result<Self, RejectedFormat> {
        let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();

        let len = digits.chars().count();
        if len != DIGIT_COUNT {
            return Err(RejectedFormat {
                raw: raw.to_string(),
                reason: RejectReason::WrongLength(len),
            });
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RejectedFormat {
                raw: raw.to_string(),
                reason: RejectReason::NonDigit,
            });
        }

        let (prefix, suffix) = digits.split_at(PREFIX_LEN);
        Ok(Self(format!("{}-{}", prefix, suffix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The seven digits without the separator.
    pub fn digits(&self) -> String {
        self.0.replace('-', "")
    }
}

impl fmt::Display for NormalizedPostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NormalizedPostalCode {
    type Err = RejectedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NormalizedPostalCode {
    type Error = RejectedFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NormalizedPostalCode> for String {
    fn from(code: NormalizedPostalCode) -> Self {
        code.0
    }
}

impl AsRef<str> for NormalizedPostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_digits_are_hyphenated() {
        let code = NormalizedPostalCode::parse("1000000").unwrap();
        assert_eq!(code.as_str(), "1000-000");
        assert_eq!(code.digits(), "1000000");
    }

    #[test]
    fn test_hyphenated_input_is_unchanged() {
        let code = NormalizedPostalCode::parse("1000-000").unwrap();
        assert_eq!(code.as_str(), "1000-000");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let code = NormalizedPostalCode::parse("  2000-123\n").unwrap();
        assert_eq!(code.as_str(), "2000-123");
    }

    #[test]
    fn test_misplaced_hyphen_is_stripped() {
        let code = NormalizedPostalCode::parse("100-0000").unwrap();
        assert_eq!(code.as_str(), "1000-000");
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let err = NormalizedPostalCode::parse("12345").unwrap_err();
        assert_eq!(err.reason, RejectReason::WrongLength(5));
        assert_eq!(err.raw, "12345");

        let err = NormalizedPostalCode::parse("").unwrap_err();
        assert_eq!(err.reason, RejectReason::WrongLength(0));
    }

    #[test]
    fn test_non_digits_are_rejected() {
        let err = NormalizedPostalCode::parse("abcdefg").unwrap_err();
        assert_eq!(err.reason, RejectReason::NonDigit);

        let err = NormalizedPostalCode::parse("100 000").unwrap_err();
        assert_eq!(err.reason, RejectReason::NonDigit);
    }

    #[test]
    fn test_multibyte_input_counts_characters() {
        let err = NormalizedPostalCode::parse("1000-00é").unwrap_err();
        assert_eq!(err.reason, RejectReason::NonDigit);
    }

    #[test]
    fn test_from_str_and_serde() {
        let code: NormalizedPostalCode = "4000123".parse().unwrap();
        assert_eq!(code.to_string(), "4000-123");

        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"4000-123\"");
        let back: NormalizedPostalCode = serde_json::from_str("\"4000123\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<NormalizedPostalCode>("\"40001\"").is_err());
    }
}
