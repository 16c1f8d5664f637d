//! # phonebook-crypto — Cryptographic Primitives for the Phonebook Service
//!
//! - **One-time codes**: uniformly random six-digit verification codes drawn
//!   from the operating system RNG.
//! - **Session tokens**: HS256 JWTs binding a [`UserKey`](phonebook_core::UserKey)
//!   to an expiry. The HMAC secret is injected at startup and zeroized on drop.

pub mod code;
pub mod error;
pub mod session;

// Re-export primary types.
pub use code::generate_verification_code;
pub use error::CryptoError;
pub use session::{SessionClaims, SessionIssuer, SessionSecret, MIN_SECRET_LEN};
