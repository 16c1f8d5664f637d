//! In-memory store.
//!
//! All operations are synchronous under a `parking_lot::RwLock` (never held
//! across `.await`). Uniqueness checks and inserts happen under one write
//! lock, so concurrent inserts for the same number or edge pair cannot
//! both succeed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use phonebook_core::{AttemptKey, CanonicalNumber, EdgeKey, UserKey};

use super::{
    AttemptRecord, AttemptRepo, ContactEdgeRecord, ContactRepo, PhonebookStore, StoreError,
    StoreResult, UserRecord, UserRepo,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserKey, UserRecord>,
    users_by_number: HashMap<CanonicalNumber, UserKey>,
    attempts: HashMap<AttemptKey, AttemptRecord>,
    edges: HashMap<EdgeKey, ContactEdgeRecord>,
    edges_by_pair: HashMap<(UserKey, UserKey), EdgeKey>,
}

/// Thread-safe, cloneable in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }

    pub fn attempt_count(&self) -> usize {
        self.tables.read().attempts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.tables.read().edges.len()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_number(
        &self,
        number: &CanonicalNumber,
    ) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .users_by_number
            .get(number)
            .and_then(|key| tables.users.get(key))
            .cloned())
    }

    async fn get_user(&self, key: UserKey) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().users.get(&key).cloned())
    }

    async fn insert_user(&self, user: &UserRecord) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.users_by_number.contains_key(&user.number) {
            return Err(StoreError::Duplicate(format!("user number {}", user.number)));
        }
        if tables.users.contains_key(&user.key) {
            return Err(StoreError::Duplicate(format!("user key {}", user.key)));
        }
        tables.users_by_number.insert(user.number.clone(), user.key);
        tables.users.insert(user.key, user.clone());
        Ok(())
    }
}

#[async_trait]
impl AttemptRepo for MemoryStore {
    async fn insert_attempt(&self, attempt: &AttemptRecord) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.attempts.contains_key(&attempt.key) {
            return Err(StoreError::Duplicate(format!("attempt key {}", attempt.key)));
        }
        tables.attempts.insert(attempt.key, attempt.clone());
        Ok(())
    }

    async fn get_attempt(&self, key: AttemptKey) -> StoreResult<Option<AttemptRecord>> {
        Ok(self.tables.read().attempts.get(&key).cloned())
    }

    async fn delete_attempt(&self, key: AttemptKey) -> StoreResult<bool> {
        Ok(self.tables.write().attempts.remove(&key).is_some())
    }

    async fn delete_attempts_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write();
        let before = tables.attempts.len();
        tables.attempts.retain(|_, a| a.created_at >= cutoff);
        Ok((before - tables.attempts.len()) as u64)
    }
}

#[async_trait]
impl ContactRepo for MemoryStore {
    async fn find_edge(
        &self,
        from: UserKey,
        to: UserKey,
    ) -> StoreResult<Option<ContactEdgeRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .edges_by_pair
            .get(&(from, to))
            .and_then(|key| tables.edges.get(key))
            .cloned())
    }

    async fn insert_edge(&self, edge: &ContactEdgeRecord) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let pair = (edge.from, edge.to);
        if tables.edges_by_pair.contains_key(&pair) {
            return Err(StoreError::Duplicate(format!(
                "contact edge {} -> {}",
                edge.from, edge.to
            )));
        }
        tables.edges_by_pair.insert(pair, edge.key);
        tables.edges.insert(edge.key, edge.clone());
        Ok(())
    }

    async fn rename_edge(&self, key: EdgeKey, name: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        match tables.edges.get_mut(&key) {
            Some(edge) => {
                edge.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_edges_from(&self, from: UserKey) -> StoreResult<Vec<ContactEdgeRecord>> {
        Ok(self
            .tables
            .read()
            .edges
            .values()
            .filter(|e| e.from == from)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PhonebookStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use phonebook_core::VerificationCode;

    fn number(s: &str) -> CanonicalNumber {
        CanonicalNumber::new(s).unwrap()
    }

    fn user(n: &str) -> UserRecord {
        UserRecord {
            key: UserKey::new(),
            number: number(n),
        }
    }

    #[tokio::test]
    async fn duplicate_number_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&user("+46708123456")).await.unwrap();
        let err = store.insert_user(&user("+46708123456")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn find_user_by_number_is_exact() {
        let store = MemoryStore::new();
        let alice = user("+46708123456");
        store.insert_user(&alice).await.unwrap();
        assert_eq!(
            store.find_user_by_number(&alice.number).await.unwrap(),
            Some(alice.clone())
        );
        assert!(store
            .find_user_by_number(&number("+46708123457"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_edge_pair_rejected() {
        let store = MemoryStore::new();
        let (a, b) = (UserKey::new(), UserKey::new());
        let edge = |name: &str| ContactEdgeRecord {
            key: EdgeKey::new(),
            from: a,
            to: b,
            name: name.into(),
        };
        store.insert_edge(&edge("Alice")).await.unwrap();
        assert!(matches!(
            store.insert_edge(&edge("Bob")).await,
            Err(StoreError::Duplicate(_))
        ));
        // Reverse direction is a different edge.
        store
            .insert_edge(&ContactEdgeRecord {
                key: EdgeKey::new(),
                from: b,
                to: a,
                name: "Carol".into(),
            })
            .await
            .unwrap();
        assert_eq!(store.edge_count(), 2);
    }

    #[tokio::test]
    async fn delete_attempts_created_before_is_strict() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for offset in [10, 5, 0] {
            store
                .insert_attempt(&AttemptRecord {
                    key: AttemptKey::new(),
                    number: number("+46708123456"),
                    code: VerificationCode::from_value(1).unwrap(),
                    created_at: now - Duration::minutes(offset),
                })
                .await
                .unwrap();
        }
        let removed = store
            .delete_attempts_created_before(now - Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.attempt_count(), 2);
    }

    #[tokio::test]
    async fn rename_missing_edge_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.rename_edge(EdgeKey::new(), "x").await.unwrap());
    }
}
