//! User identity persistence operations on the `users` table.

use phonebook_core::{CanonicalNumber, UserKey};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::UserRecord;

/// Insert a user. A second row for the same number violates
/// `users_number_key`.
pub async fn insert(pool: &PgPool, user: &UserRecord) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (id, number) VALUES ($1, $2)")
        .bind(user.key.as_uuid())
        .bind(user.number.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// Fetch a user by canonical number.
pub async fn find_by_number(
    pool: &PgPool,
    number: &CanonicalNumber,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>("SELECT id, number FROM users WHERE number = $1 LIMIT 1")
        .bind(number.as_str())
        .fetch_optional(pool)
        .await?;
    row.map(UserRow::into_record).transpose()
}

/// Fetch a user by key.
pub async fn get_by_id(pool: &PgPool, key: UserKey) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>("SELECT id, number FROM users WHERE id = $1")
        .bind(key.as_uuid())
        .fetch_optional(pool)
        .await?;
    row.map(UserRow::into_record).transpose()
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    number: String,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord, sqlx::Error> {
        let number =
            CanonicalNumber::new(self.number).map_err(|e| super::decode_error("users", e))?;
        Ok(UserRecord {
            key: UserKey::from_uuid(self.id),
            number,
        })
    }
}
