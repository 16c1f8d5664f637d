//! PostgreSQL-backed store. Delegates to the table modules in [`crate::db`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use phonebook_core::{AttemptKey, CanonicalNumber, EdgeKey, UserKey};
use sqlx::PgPool;

use super::{
    AttemptRecord, AttemptRepo, ContactEdgeRecord, ContactRepo, PhonebookStore, StoreResult,
    UserRecord, UserRepo,
};
use crate::db;

/// Store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_user_by_number(
        &self,
        number: &CanonicalNumber,
    ) -> StoreResult<Option<UserRecord>> {
        Ok(db::users::find_by_number(&self.pool, number).await?)
    }

    async fn get_user(&self, key: UserKey) -> StoreResult<Option<UserRecord>> {
        Ok(db::users::get_by_id(&self.pool, key).await?)
    }

    async fn insert_user(&self, user: &UserRecord) -> StoreResult<()> {
        Ok(db::users::insert(&self.pool, user).await?)
    }
}

#[async_trait]
impl AttemptRepo for PgStore {
    async fn insert_attempt(&self, attempt: &AttemptRecord) -> StoreResult<()> {
        Ok(db::attempts::insert(&self.pool, attempt).await?)
    }

    async fn get_attempt(&self, key: AttemptKey) -> StoreResult<Option<AttemptRecord>> {
        Ok(db::attempts::get_by_id(&self.pool, key).await?)
    }

    async fn delete_attempt(&self, key: AttemptKey) -> StoreResult<bool> {
        Ok(db::attempts::delete(&self.pool, key).await?)
    }

    async fn delete_attempts_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        Ok(db::attempts::delete_created_before(&self.pool, cutoff).await?)
    }
}

#[async_trait]
impl ContactRepo for PgStore {
    async fn find_edge(
        &self,
        from: UserKey,
        to: UserKey,
    ) -> StoreResult<Option<ContactEdgeRecord>> {
        Ok(db::contacts::find_by_pair(&self.pool, from, to).await?)
    }

    async fn insert_edge(&self, edge: &ContactEdgeRecord) -> StoreResult<()> {
        Ok(db::contacts::insert(&self.pool, edge).await?)
    }

    async fn rename_edge(&self, key: EdgeKey, name: &str) -> StoreResult<bool> {
        Ok(db::contacts::rename(&self.pool, key, name).await?)
    }

    async fn list_edges_from(&self, from: UserKey) -> StoreResult<Vec<ContactEdgeRecord>> {
        Ok(db::contacts::list_from(&self.pool, from).await?)
    }
}

#[async_trait]
impl PhonebookStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
