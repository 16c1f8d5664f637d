//! # Verification Ledger
//!
//! Issues, validates and expires one-time codes tied to a claimed number.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──► pending ──┬─ verify, code matches, in window ──► deleted (Accepted)
//!                      ├─ verify, past window ─────────────► deleted (Expired)
//!                      ├─ verify, code differs, in window ──► pending (Mismatch)
//!                      ├─ cancel ───────────────────────────► deleted
//!                      └─ janitor sweep, past window ───────► deleted
//! ```
//!
//! A mismatch leaves the attempt in place so the caller can retry until the
//! window closes; an expiry check consumes it. The window is inclusive:
//! an attempt verified exactly [`VERIFICATION_WINDOW_SECS`] after creation
//! is still live.
//!
//! Every operation takes `now` explicitly. Handlers pass the wall clock.

use chrono::{DateTime, Duration, Utc};
use phonebook_core::{AttemptKey, CanonicalNumber};
use phonebook_crypto::generate_verification_code;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::delivery::{CodeDelivery, DeliveryError};
use crate::store::{AttemptRecord, PhonebookStore, StoreError};

/// Validity window of an attempt, in seconds.
pub const VERIFICATION_WINDOW_SECS: i64 = 5 * 60;

/// Validity window of an attempt.
pub fn verification_window() -> Duration {
    Duration::seconds(VERIFICATION_WINDOW_SECS)
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("verification attempt {0} not found")]
    NotFound(AttemptKey),

    #[error("code delivery failed")]
    Delivery(#[source] DeliveryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a verify call on an existing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched inside the window. The attempt is gone.
    Accepted { number: CanonicalNumber },
    /// Window had closed. The attempt is gone.
    Expired,
    /// Code differed. The attempt is still pending.
    Mismatch,
}

impl VerifyOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Persist a new attempt for `number` and hand its code to `delivery`.
///
/// If delivery fails the attempt is removed again, since nobody can
/// complete it.
pub async fn create_attempt(
    store: &dyn PhonebookStore,
    delivery: &dyn CodeDelivery,
    number: CanonicalNumber,
    now: DateTime<Utc>,
) -> Result<AttemptKey, LedgerError> {
    let attempt = AttemptRecord {
        key: AttemptKey::new(),
        number,
        code: generate_verification_code(),
        created_at: now,
    };
    store.insert_attempt(&attempt).await?;

    if let Err(e) = delivery
        .deliver(attempt.key, &attempt.number, &attempt.code)
        .await
    {
        tracing::warn!(attempt_key = %attempt.key, error = %e, "code delivery failed, discarding attempt");
        store.delete_attempt(attempt.key).await?;
        return Err(LedgerError::Delivery(e));
    }

    Ok(attempt.key)
}

/// Delete a pending attempt.
pub async fn cancel_attempt(store: &dyn PhonebookStore, key: AttemptKey) -> Result<(), LedgerError> {
    if store.delete_attempt(key).await? {
        tracing::info!(attempt_key = %key, "verification attempt cancelled");
        Ok(())
    } else {
        Err(LedgerError::NotFound(key))
    }
}

/// Check `supplied` against the attempt's code at time `now`.
pub async fn verify(
    store: &dyn PhonebookStore,
    key: AttemptKey,
    supplied: &str,
    now: DateTime<Utc>,
) -> Result<VerifyOutcome, LedgerError> {
    let attempt = store
        .get_attempt(key)
        .await?
        .ok_or(LedgerError::NotFound(key))?;

    if now > attempt.created_at + verification_window() {
        store.delete_attempt(key).await?;
        tracing::info!(attempt_key = %key, "verification attempt expired");
        return Ok(VerifyOutcome::Expired);
    }

    if codes_match(attempt.code.as_str(), supplied) {
        store.delete_attempt(key).await?;
        return Ok(VerifyOutcome::Accepted {
            number: attempt.number,
        });
    }

    tracing::debug!(attempt_key = %key, "verification code mismatch");
    Ok(VerifyOutcome::Mismatch)
}

/// Delete every attempt whose window closed before `now`.
pub async fn purge_expired(store: &dyn PhonebookStore, now: DateTime<Utc>) -> Result<u64, StoreError> {
    store
        .delete_attempts_created_before(now - verification_window())
        .await
}

/// Byte-for-byte comparison in constant time for equal lengths.
fn codes_match(expected: &str, supplied: &str) -> bool {
    let expected = expected.as_bytes();
    let supplied = supplied.as_bytes();
    if expected.len() != supplied.len() {
        return false;
    }
    expected.ct_eq(supplied).into()
}
