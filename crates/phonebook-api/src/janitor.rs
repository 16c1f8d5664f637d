//! Periodic sweep of stale verification attempts.
//!
//! Expiry is enforced on verify regardless; the sweep only bounds how long
//! abandoned attempts linger in the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::ledger;
use crate::store::PhonebookStore;

/// Run one sweep. Returns the number of attempts removed.
pub async fn sweep_once(store: &dyn PhonebookStore) -> u64 {
    match ledger::purge_expired(store, Utc::now()).await {
        Ok(0) => 0,
        Ok(removed) => {
            tracing::info!(removed, "purged expired verification attempts");
            removed
        }
        Err(e) => {
            tracing::error!(error = %e, "verification sweep failed");
            0
        }
    }
}

/// Spawn the sweep loop. The task runs until the runtime shuts down or the
/// handle is aborted.
pub fn spawn(store: Arc<dyn PhonebookStore>, every: Duration) -> JoinHandle<()> {
    tracing::info!(interval_secs = every.as_secs(), "verification janitor started");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(store.as_ref()).await;
        }
    })
}
