//! # Verification Codes
//!
//! A verification code is exactly six ASCII digits, leading zeros kept.
//! Generation lives in `phonebook-crypto`; this type only guarantees shape.

use crate::error::ValidationError;

/// The largest code value, `999999`.
pub const MAX_CODE_VALUE: u32 = 999_999;

/// A six-digit one-time code.
///
/// `Debug` is redacted so codes never leak through `{:?}` formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Build a code from its numeric value, zero-padded to six digits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CodeOutOfRange`] for values above 999999.
    pub fn from_value(value: u32) -> Result<Self, ValidationError> {
        if value > MAX_CODE_VALUE {
            return Err(ValidationError::CodeOutOfRange(value));
        }
        Ok(Self(format!("{value:06}")))
    }

    /// Parse a code from text, e.g. a stored column value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCode`] unless the text is exactly
    /// six ASCII digits.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidCode);
        }
        Ok(Self(s))
    }

    /// The six-digit text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerificationCode([REDACTED])")
    }
}
