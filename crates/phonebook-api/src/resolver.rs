//! # Identity Resolution
//!
//! Maps a canonical phone number to exactly one durable [`UserKey`],
//! creating the identity on first sighting.
//!
//! The lookup and the create are separate store calls. A concurrent request
//! can create the same number in between; the store's uniqueness rule
//! rejects the loser's insert with [`StoreError::Duplicate`], and the loser
//! re-reads and returns the winner's key. Either way every caller ends up
//! with the same key.

use phonebook_core::{CanonicalNumber, UserKey};

use crate::store::{PhonebookStore, StoreError, UserRecord};

/// Return the key of the identity owning `number`, creating it if absent.
pub async fn resolve(
    store: &dyn PhonebookStore,
    number: &CanonicalNumber,
) -> Result<UserKey, StoreError> {
    if let Some(existing) = store.find_user_by_number(number).await? {
        return Ok(existing.key);
    }

    let user = UserRecord {
        key: UserKey::new(),
        number: number.clone(),
    };

    match store.insert_user(&user).await {
        Ok(()) => {
            tracing::info!(user_key = %user.key, "created user identity");
            Ok(user.key)
        }
        Err(StoreError::Duplicate(constraint)) => {
            tracing::debug!(%constraint, "lost identity creation race, re-reading");
            store
                .find_user_by_number(number)
                .await?
                .map(|winner| winner.key)
                .ok_or_else(|| {
                    StoreError::Corrupt(format!(
                        "insert for {number} rejected as duplicate but no user found"
                    ))
                })
        }
        Err(e) => Err(e),
    }
}

/// Dereference a user key.
pub async fn get(store: &dyn PhonebookStore, key: UserKey) -> Result<Option<UserRecord>, StoreError> {
    store.get_user(key).await
}
