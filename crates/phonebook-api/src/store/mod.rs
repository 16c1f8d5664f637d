//! # Persistence Capability
//!
//! Every component takes the store as a `&dyn PhonebookStore` parameter;
//! nothing keeps authoritative state in process memory between requests.
//!
//! ## Collections
//!
//! - **users** — one [`UserRecord`] per canonical number (unique).
//! - **verification_attempts** — pending [`AttemptRecord`]s.
//! - **contacts** — directed [`ContactEdgeRecord`]s, unique per
//!   `(from, to)` pair.
//!
//! ## Uniqueness
//!
//! Inserts that would violate a uniqueness rule fail with
//! [`StoreError::Duplicate`] instead of silently creating a second record.
//! Callers treat that as "somebody else won the race" and re-read.
//!
//! Two implementations ship: [`MemoryStore`] for development and tests,
//! [`PgStore`] for PostgreSQL.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use phonebook_core::{AttemptKey, CanonicalNumber, EdgeKey, UserKey, VerificationCode};
use thiserror::Error;

/// A durable user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub key: UserKey,
    pub number: CanonicalNumber,
}

/// A pending verification-code claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub key: AttemptKey,
    pub number: CanonicalNumber,
    pub code: VerificationCode,
    pub created_at: DateTime<Utc>,
}

/// A directed, named edge from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEdgeRecord {
    pub key: EdgeKey,
    pub from: UserKey,
    pub to: UserKey,
    pub name: String,
}

/// Persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Insert rejected by a uniqueness rule.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// A stored row could not be mapped back to a domain record.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Duplicate(db_err.constraint().unwrap_or("unique key").to_string())
            }
            other => Self::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User identity operations.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Exact-match lookup by canonical number.
    async fn find_user_by_number(&self, number: &CanonicalNumber)
        -> StoreResult<Option<UserRecord>>;

    async fn get_user(&self, key: UserKey) -> StoreResult<Option<UserRecord>>;

    /// Insert a new identity. Fails with [`StoreError::Duplicate`] when the
    /// number is already taken.
    async fn insert_user(&self, user: &UserRecord) -> StoreResult<()>;
}

/// Verification attempt operations.
#[async_trait]
pub trait AttemptRepo: Send + Sync {
    async fn insert_attempt(&self, attempt: &AttemptRecord) -> StoreResult<()>;

    async fn get_attempt(&self, key: AttemptKey) -> StoreResult<Option<AttemptRecord>>;

    /// Delete an attempt. Returns `false` if it did not exist.
    async fn delete_attempt(&self, key: AttemptKey) -> StoreResult<bool>;

    /// Delete every attempt created strictly before `cutoff`. Returns the
    /// number removed.
    async fn delete_attempts_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

/// Contact edge operations.
#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn find_edge(&self, from: UserKey, to: UserKey)
        -> StoreResult<Option<ContactEdgeRecord>>;

    /// Insert a new edge. Fails with [`StoreError::Duplicate`] when an edge
    /// for the same `(from, to)` pair exists.
    async fn insert_edge(&self, edge: &ContactEdgeRecord) -> StoreResult<()>;

    /// Replace an edge's name. Returns `false` if the edge is gone.
    async fn rename_edge(&self, key: EdgeKey, name: &str) -> StoreResult<bool>;

    /// All outbound edges of `from`, in store order.
    async fn list_edges_from(&self, from: UserKey) -> StoreResult<Vec<ContactEdgeRecord>>;
}

/// Combined store capability handed to every component.
#[async_trait]
pub trait PhonebookStore: UserRepo + AttemptRepo + ContactRepo + Send + Sync {
    /// Check connectivity. Used by the readiness probe.
    async fn health_check(&self) -> StoreResult<()>;
}
