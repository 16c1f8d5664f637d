//! # Database Persistence Layer
//!
//! PostgreSQL persistence via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the API
//! persists users, verification attempts and contact edges to PostgreSQL
//! through [`PgStore`](crate::store::PgStore). When absent, the API runs on
//! the in-memory store (suitable for development and testing).
//!
//! Each submodule holds free functions taking a `&PgPool` and operating on
//! one table. Uniqueness (`users.number`, `contacts (from_user, to_user)`)
//! is enforced by unique indexes in `migrations/`.

pub mod attempts;
pub mod contacts;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let url = match url {
        Some(url) => url,
        None => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Map a domain validation failure on a stored column to a decode error.
pub(crate) fn decode_error(
    table: &'static str,
    err: phonebook_core::ValidationError,
) -> sqlx::Error {
    tracing::error!(table, error = %err, "stored row failed validation");
    sqlx::Error::Decode(Box::new(err))
}
