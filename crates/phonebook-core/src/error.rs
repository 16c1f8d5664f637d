//! # Error Hierarchy
//!
//! Validation errors for domain primitives and phone-number input.
//! Each variant carries the rejected input so operators can diagnose a bad
//! request from the log line alone.

use thiserror::Error;

/// Validation errors for domain primitive newtypes and canonicalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The phone number text could not be parsed at all.
    #[error("unparseable phone number \"{raw}\": {reason}")]
    UnparseableNumber {
        /// The raw text as submitted.
        raw: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Region hint is not a two-letter ISO 3166-1 code known to the parser.
    #[error("unsupported region code: \"{0}\" (expected two-letter ISO 3166-1 code)")]
    UnsupportedRegion(String),

    /// Canonical number does not have E.164 shape.
    #[error("invalid canonical number: \"{0}\" (expected +<country><subscriber>, at most 15 digits)")]
    InvalidCanonicalNumber(String),

    /// Verification code is not exactly six ASCII digits.
    #[error("invalid verification code format (expected 6 digits)")]
    InvalidCode,

    /// Numeric code value is outside 0..=999999.
    #[error("verification code value out of range: {0}")]
    CodeOutOfRange(u32),

    /// Identifier is not a valid UUID.
    #[error("invalid key \"{value}\": {reason}")]
    InvalidKey {
        /// The rejected identifier text.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}
