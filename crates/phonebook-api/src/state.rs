//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Everything in [`AppState`] is immutable after startup or behind an
//! `Arc<dyn ...>` capability; handlers own no mutable process state.
//!
//! ## Configuration
//!
//! | Variable                  | Default    | Meaning                                  |
//! |---------------------------|------------|------------------------------------------|
//! | `PORT`                    | `3000`     | Listen port                              |
//! | `DATABASE_URL`            | unset      | PostgreSQL URL; unset runs in memory     |
//! | `JWT_SECRET`              | required   | HMAC key for session tokens, >= 32 bytes |
//! | `SESSION_TTL_SECS`        | `2592000`  | Session token lifetime (30 days)         |
//! | `DEFAULT_REGION`          | `SE`       | Region for claims without `country_code` |
//! | `VERIFICATION_SWEEP_SECS` | unset      | Janitor interval; unset disables it      |

use std::sync::Arc;
use std::time::Duration;

use phonebook_core::{Canonicalizer, PhoneNumberCanonicalizer, RegionCode};
use phonebook_crypto::{CryptoError, SessionIssuer, SessionSecret};
use thiserror::Error;

use crate::delivery::{CodeDelivery, LogDelivery};
use crate::store::PhonebookStore;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;
pub const DEFAULT_REGION: &str = "SE";

/// Startup configuration failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("session secret rejected: {0}")]
    Secret(#[from] CryptoError),
}

/// Application configuration.
///
/// Custom `Debug` redacts the session secret and the database URL.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub session_secret: Arc<SessionSecret>,
    pub session_ttl: Duration,
    pub default_region: RegionCode,
    pub sweep_interval: Option<Duration>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl", &self.session_ttl)
            .field("default_region", &self.default_region)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

impl AppConfig {
    /// Defaults for everything except the secret, which has none.
    pub fn new(session_secret: SessionSecret) -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            session_secret: Arc::new(session_secret),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            default_region: RegionCode::new(DEFAULT_REGION)
                .unwrap_or_else(|_| unreachable!("default region literal is valid")),
            sweep_interval: None,
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::new(SessionSecret::new(secret.into_bytes())?);

        if let Some(port) = get("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        config.database_url = get("DATABASE_URL");
        if let Some(ttl) = get("SESSION_TTL_SECS") {
            let secs: u64 = parse_var("SESSION_TTL_SECS", &ttl)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "SESSION_TTL_SECS",
                    reason: "must be positive".into(),
                });
            }
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(region) = get("DEFAULT_REGION") {
            config.default_region =
                RegionCode::new(&region).map_err(|e| ConfigError::Invalid {
                    var: "DEFAULT_REGION",
                    reason: e.to_string(),
                })?;
        }
        if let Some(sweep) = get("VERIFICATION_SWEEP_SECS") {
            let secs: u64 = parse_var("VERIFICATION_SWEEP_SECS", &sweep)?;
            config.sweep_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PhonebookStore>,
    pub canonicalizer: Arc<dyn Canonicalizer>,
    pub sessions: Arc<SessionIssuer>,
    pub delivery: Arc<dyn CodeDelivery>,
    pub config: Arc<AppConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state over `store` with the `phonenumber` canonicalizer and
    /// log-only code delivery.
    pub fn new(config: AppConfig, store: Arc<dyn PhonebookStore>) -> Result<Self, ConfigError> {
        let ttl = chrono::Duration::from_std(config.session_ttl).map_err(|e| {
            ConfigError::Invalid {
                var: "SESSION_TTL_SECS",
                reason: e.to_string(),
            }
        })?;
        let sessions = SessionIssuer::new(&config.session_secret, ttl);
        Ok(Self {
            store,
            canonicalizer: Arc::new(PhoneNumberCanonicalizer),
            sessions: Arc::new(sessions),
            delivery: Arc::new(LogDelivery),
            config: Arc::new(config),
        })
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn CodeDelivery>) -> Self {
        self.delivery = delivery;
        self
    }
}
