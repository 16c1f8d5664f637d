//! Cryptographic error types.

use thiserror::Error;

/// Failures while minting or checking credentials.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The configured secret is too short to key HMAC-SHA256 safely.
    #[error("session secret too short: {actual} bytes (minimum {minimum})")]
    WeakSecret {
        /// Length of the rejected secret.
        actual: usize,
        /// Required minimum length.
        minimum: usize,
    },

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Token failed signature, algorithm, or claim validation.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token signature checked out but it is past `exp`.
    #[error("token expired")]
    Expired,
}
