//! # Phone Number Primitives
//!
//! [`CanonicalNumber`] is the E.164 text form that keys user identities.
//! [`RegionCode`] is the upper-cased ISO 3166-1 alpha-2 hint used to
//! interpret national-format input.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A phone number in E.164 form, e.g. `+46708123456`.
///
/// Shape is checked at construction: a leading `+`, a non-zero country
/// digit, and at most 15 digits in total. Whether the number is actually
/// assigned is the canonicalizer's concern, not this type's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalNumber(String);

impl CanonicalNumber {
    /// Validate and wrap an E.164 string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCanonicalNumber`] when the text
    /// is not `+` followed by 2 to 15 digits starting with 1-9.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let digits = match s.strip_prefix('+') {
            Some(d) => d,
            None => return Err(ValidationError::InvalidCanonicalNumber(s)),
        };
        let well_formed = (2..=15).contains(&digits.len())
            && digits.bytes().all(|b| b.is_ascii_digit())
            && !digits.starts_with('0');
        if !well_formed {
            return Err(ValidationError::InvalidCanonicalNumber(s));
        }
        Ok(Self(s))
    }

    /// The E.164 text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CanonicalNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for CanonicalNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two-letter region hint, always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    /// Normalize and validate a region hint. Surrounding whitespace is
    /// trimmed and the code is upper-cased, so `"se"` and `" SE "` are the
    /// same region.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedRegion`] unless the input is
    /// exactly two ASCII letters.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.len() != 2 || !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(ValidationError::UnsupportedRegion(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The upper-case code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RegionCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
