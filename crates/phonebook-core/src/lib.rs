#![deny(missing_docs)]

//! # phonebook-core — Foundational Types for the Phonebook Service
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`, `thiserror`,
//! `uuid` and `phonenumber` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass an [`AttemptKey`] where a [`UserKey`]
//!    is expected.
//!
//! 2. **[`CanonicalNumber`] is the only phone-number representation that
//!    reaches the store.** Raw user input goes through a [`Canonicalizer`]
//!    first, so two spellings of one number always resolve to one identity.
//!
//! 3. **[`ValidationError`] for every rejected input.** Structured errors
//!    with `thiserror`, no `.unwrap()` outside tests.

pub mod canonicalize;
pub mod code;
pub mod error;
pub mod identity;
pub mod number;

// Re-export primary types at crate root for ergonomic imports.
pub use canonicalize::{Canonicalized, Canonicalizer, PhoneNumberCanonicalizer};
pub use code::VerificationCode;
pub use error::ValidationError;
pub use identity::{AttemptKey, EdgeKey, UserKey};
pub use number::{CanonicalNumber, RegionCode};
