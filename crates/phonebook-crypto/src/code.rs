//! # Verification Code Generation
//!
//! Codes are drawn uniformly from `0..=999999` with the operating system
//! RNG. `gen_range` rejects biased samples internally, so every code is
//! equally likely.

use phonebook_core::code::MAX_CODE_VALUE;
use phonebook_core::VerificationCode;
use rand::rngs::OsRng;
use rand::Rng;

/// Generate a fresh six-digit code.
pub fn generate_verification_code() -> VerificationCode {
    generate_with(&mut OsRng)
}

/// Generate a code from the given RNG.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> VerificationCode {
    let value = rng.gen_range(0..=MAX_CODE_VALUE);
    // In range by construction.
    match VerificationCode::from_value(value) {
        Ok(code) => code,
        Err(_) => unreachable!("gen_range bound is MAX_CODE_VALUE"),
    }
}
