//! # Code Delivery
//!
//! Out-of-band delivery of verification codes to the number's owner.
//! [`LogDelivery`] writes the code to the server log instead of sending it,
//! as a development aid. An SMS gateway plugs in behind [`CodeDelivery`].

use async_trait::async_trait;
use phonebook_core::{AttemptKey, CanonicalNumber, VerificationCode};
use thiserror::Error;

/// Why a code could not be handed to its number.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The gateway could not be reached or refused the request.
    #[error("delivery gateway unavailable: {0}")]
    Unavailable(String),
}

/// Sends a freshly issued code to its number.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    async fn deliver(
        &self,
        attempt: AttemptKey,
        number: &CanonicalNumber,
        code: &VerificationCode,
    ) -> Result<(), DeliveryError>;
}

/// Logs codes at `info`. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

#[async_trait]
impl CodeDelivery for LogDelivery {
    async fn deliver(
        &self,
        attempt: AttemptKey,
        _number: &CanonicalNumber,
        code: &VerificationCode,
    ) -> Result<(), DeliveryError> {
        tracing::info!(attempt_key = %attempt, code = code.as_str(), "verification code issued");
        Ok(())
    }
}
