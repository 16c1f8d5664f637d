//! Verification attempt persistence operations on the
//! `verification_attempts` table.

use chrono::{DateTime, Utc};
use phonebook_core::{AttemptKey, CanonicalNumber, VerificationCode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::AttemptRecord;

pub async fn insert(pool: &PgPool, attempt: &AttemptRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO verification_attempts (id, number, code, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(attempt.key.as_uuid())
    .bind(attempt.number.as_str())
    .bind(attempt.code.as_str())
    .bind(attempt.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_by_id(
    pool: &PgPool,
    key: AttemptKey,
) -> Result<Option<AttemptRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, AttemptRow>(
        "SELECT id, number, code, created_at FROM verification_attempts WHERE id = $1",
    )
    .bind(key.as_uuid())
    .fetch_optional(pool)
    .await?;
    row.map(AttemptRow::into_record).transpose()
}

/// Delete one attempt. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, key: AttemptKey) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM verification_attempts WHERE id = $1")
        .bind(key.as_uuid())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete attempts created strictly before `cutoff`.
pub async fn delete_created_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM verification_attempts WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: Uuid,
    number: String,
    code: String,
    created_at: DateTime<Utc>,
}

impl AttemptRow {
    fn into_record(self) -> Result<AttemptRecord, sqlx::Error> {
        let decode = |e| super::decode_error("verification_attempts", e);
        Ok(AttemptRecord {
            key: AttemptKey::from_uuid(self.id),
            number: CanonicalNumber::new(self.number).map_err(decode)?,
            code: VerificationCode::parse(self.code).map_err(decode)?,
            created_at: self.created_at,
        })
    }
}
