//! Contact edge persistence operations on the `contacts` table.

use phonebook_core::{EdgeKey, UserKey};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::ContactEdgeRecord;

/// Insert an edge. A second row for the same `(from_user, to_user)` pair
/// violates `contacts_pair_key`.
pub async fn insert(pool: &PgPool, edge: &ContactEdgeRecord) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO contacts (id, from_user, to_user, name) VALUES ($1, $2, $3, $4)")
        .bind(edge.key.as_uuid())
        .bind(edge.from.as_uuid())
        .bind(edge.to.as_uuid())
        .bind(&edge.name)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_by_pair(
    pool: &PgPool,
    from: UserKey,
    to: UserKey,
) -> Result<Option<ContactEdgeRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, EdgeRow>(
        "SELECT id, from_user, to_user, name FROM contacts
         WHERE from_user = $1 AND to_user = $2 LIMIT 1",
    )
    .bind(from.as_uuid())
    .bind(to.as_uuid())
    .fetch_optional(pool)
    .await?;
    Ok(row.map(EdgeRow::into_record))
}

/// Update an edge's name. Returns whether a row was updated.
pub async fn rename(pool: &PgPool, key: EdgeKey, name: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE contacts SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(key.as_uuid())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All outbound edges of `from`.
pub async fn list_from(pool: &PgPool, from: UserKey) -> Result<Vec<ContactEdgeRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EdgeRow>(
        "SELECT id, from_user, to_user, name FROM contacts WHERE from_user = $1",
    )
    .bind(from.as_uuid())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(EdgeRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct EdgeRow {
    id: Uuid,
    from_user: Uuid,
    to_user: Uuid,
    name: String,
}

impl EdgeRow {
    fn into_record(self) -> ContactEdgeRecord {
        ContactEdgeRecord {
            key: EdgeKey::from_uuid(self.id),
            from: UserKey::from_uuid(self.from_user),
            to: UserKey::from_uuid(self.to_user),
            name: self.name,
        }
    }
}
