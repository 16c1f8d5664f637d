//! # Contact Graph
//!
//! Ingests an owner's address book as directed, named edges and reads the
//! owner's one-hop neighbourhood back.
//!
//! Each edge runs from the owner to the identity of a contact's number and
//! carries the owner's label for it. At most one edge exists per ordered
//! pair; re-submitting a contact under a new name renames the edge.
//!
//! Batches are applied item by item without a transaction. An item whose
//! number cannot be parsed aborts the batch with
//! [`GraphError::InvalidContact`], and earlier items stay applied. An item
//! that parses but is not a valid number for its region is skipped; a
//! blank or unknown region hint counts as such when the number carries its
//! own `+` country code.

use phonebook_core::{Canonicalizer, EdgeKey, UserKey, ValidationError};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::resolver;
use crate::store::{ContactEdgeRecord, PhonebookStore, StoreError};

/// One address-book row as submitted by the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEntry {
    pub raw_number: String,
    /// Region hint, any case.
    pub region: String,
    pub name: String,
}

/// Per-batch counts, logged after ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub created: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("contact #{index} is invalid: {source}")]
    InvalidContact {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("user {0} not found")]
    OwnerNotFound(UserKey),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A neighbour as seen from the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ContactView {
    /// The owner's label for this contact.
    pub name: String,
    #[schema(value_type = String, format = Uuid)]
    pub user_key: UserKey,
}

enum Upsert {
    Created,
    Renamed,
    Unchanged,
}

/// Upsert one edge per entry, in order.
pub async fn add_contacts(
    store: &dyn PhonebookStore,
    canonicalizer: &dyn Canonicalizer,
    owner: UserKey,
    entries: &[ContactEntry],
) -> Result<IngestSummary, GraphError> {
    let mut summary = IngestSummary::default();

    for (index, entry) in entries.iter().enumerate() {
        let invalid = |source| GraphError::InvalidContact { index, source };

        let canonical = canonicalizer
            .canonicalize_hinted(&entry.raw_number, &entry.region)
            .map_err(invalid)?;

        if !canonical.valid_for_region {
            tracing::debug!(
                %owner,
                index,
                region = %entry.region,
                "skipping contact not valid for its region"
            );
            summary.skipped += 1;
            continue;
        }

        let contact = resolver::resolve(store, &canonical.number).await?;
        match upsert_edge(store, owner, contact, &entry.name).await? {
            Upsert::Created => summary.created += 1,
            Upsert::Renamed => summary.renamed += 1,
            Upsert::Unchanged => summary.unchanged += 1,
        }
    }

    tracing::info!(
        %owner,
        created = summary.created,
        renamed = summary.renamed,
        unchanged = summary.unchanged,
        skipped = summary.skipped,
        "contacts ingested"
    );
    Ok(summary)
}

async fn upsert_edge(
    store: &dyn PhonebookStore,
    from: UserKey,
    to: UserKey,
    name: &str,
) -> Result<Upsert, StoreError> {
    if let Some(existing) = store.find_edge(from, to).await? {
        return relabel(store, &existing, name).await;
    }

    let edge = ContactEdgeRecord {
        key: EdgeKey::new(),
        from,
        to,
        name: name.to_string(),
    };
    match store.insert_edge(&edge).await {
        Ok(()) => Ok(Upsert::Created),
        Err(StoreError::Duplicate(_)) => {
            let winner = store.find_edge(from, to).await?.ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "edge {from} -> {to} rejected as duplicate but not found"
                ))
            })?;
            relabel(store, &winner, name).await
        }
        Err(e) => Err(e),
    }
}

async fn relabel(
    store: &dyn PhonebookStore,
    edge: &ContactEdgeRecord,
    name: &str,
) -> Result<Upsert, StoreError> {
    if edge.name == name {
        return Ok(Upsert::Unchanged);
    }
    if store.rename_edge(edge.key, name).await? {
        Ok(Upsert::Renamed)
    } else {
        Err(StoreError::Corrupt(format!("edge {} vanished during rename", edge.key)))
    }
}

/// Every outbound edge of `owner`, one hop.
pub async fn list_contacts(
    store: &dyn PhonebookStore,
    owner: UserKey,
) -> Result<Vec<ContactView>, GraphError> {
    if store.get_user(owner).await?.is_none() {
        return Err(GraphError::OwnerNotFound(owner));
    }

    Ok(store
        .list_edges_from(owner)
        .await?
        .into_iter()
        .map(|edge| ContactView {
            name: edge.name,
            user_key: edge.to,
        })
        .collect())
}
