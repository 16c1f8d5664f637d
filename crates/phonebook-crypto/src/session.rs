//! # Session Tokens
//!
//! Bearer credentials handed out after a successful verification.
//!
//! ## Token Format
//!
//! HS256 JWT with claims:
//!
//! ```text
//! { "user_key": "<uuid>", "iat": <unix>, "nbf": <unix>, "exp": <unix> }
//! ```
//!
//! Validation accepts only HS256, requires `exp`, and applies zero leeway,
//! so a token is valid iff its signature checks and `nbf <= now <= exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use phonebook_core::UserKey;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Minimum HMAC secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// HMAC key material. Zeroized on drop, redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    /// Wrap secret bytes, rejecting anything shorter than [`MIN_SECRET_LEN`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(CryptoError::WeakSecret {
                actual: bytes.len(),
                minimum: MIN_SECRET_LEN,
            });
        }
        Ok(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionSecret([REDACTED])")
    }
}

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_key: UserKey,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Mints and checks session tokens with one process-wide secret.
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionIssuer {
    /// Build an issuer. Tokens live for `ttl` from issuance.
    pub fn new(secret: &SessionSecret, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_key`, valid from now.
    pub fn issue(&self, user_key: UserKey) -> Result<String, CryptoError> {
        self.issue_at(user_key, Utc::now())
    }

    /// Issue a token as if minted at `issued_at`.
    pub fn issue_at(
        &self,
        user_key: UserKey,
        issued_at: DateTime<Utc>,
    ) -> Result<String, CryptoError> {
        let iat = issued_at.timestamp();
        let claims = SessionClaims {
            user_key,
            iat,
            nbf: iat,
            exp: (issued_at + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CryptoError::Signing(e.to_string()))
    }

    /// Check signature, algorithm and time claims; return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, CryptoError> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CryptoError::Expired,
                _ => CryptoError::InvalidToken(e.to_string()),
            })
    }
}
