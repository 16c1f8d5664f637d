//! # Contacts API
//!
//! Address-book upload and one-hop contact listing for the authenticated
//! caller.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use phonebook_core::UserKey;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, optional_json};
use crate::graph::{self, ContactEntry, ContactView};
use crate::routes::verification::MessageResponse;
use crate::state::AppState;

/// One address-book row.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactInput {
    /// Region of the number as stored in the address book, any case.
    pub country_code: String,
    pub number: String,
    /// The caller's label for this contact.
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddContactsRequest {
    pub contacts: Vec<ContactInput>,
}

/// Optional body of `GET /api/contacts`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ListContactsRequest {
    /// Whose contacts to list. Defaults to the caller.
    #[serde(default)]
    pub user_key: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-contacts", post(add_contacts))
        .route("/contacts", get(list_contacts))
}

/// POST /api/add-contacts — Upsert the caller's outbound contact edges.
#[utoipa::path(
    post,
    path = "/api/add-contacts",
    request_body = AddContactsRequest,
    responses(
        (status = 200, description = "Contacts ingested", body = MessageResponse),
        (status = 400, description = "A contact number could not be parsed", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "contacts"
)]
async fn add_contacts(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<AddContactsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let req = extract_json(body)?;
    let entries: Vec<ContactEntry> = req
        .contacts
        .into_iter()
        .map(|c| ContactEntry {
            raw_number: c.number,
            region: c.country_code,
            name: c.name,
        })
        .collect();

    graph::add_contacts(
        state.store.as_ref(),
        state.canonicalizer.as_ref(),
        caller.user_key,
        &entries,
    )
    .await?;

    Ok(Json(MessageResponse::new("Contacts added")))
}

/// GET /api/contacts — One-hop contact list.
///
/// Lists the caller's contacts, or those of `user_key` when the request
/// carries a body naming one.
#[utoipa::path(
    get,
    path = "/api/contacts",
    request_body(content = ListContactsRequest, description = "Optional owner override"),
    responses(
        (status = 200, description = "Outbound contacts", body = Vec<ContactView>),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ErrorBody),
        (status = 404, description = "Owner not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "contacts"
)]
async fn list_contacts(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Bytes,
) -> Result<Json<Vec<ContactView>>, AppError> {
    let req: ListContactsRequest = optional_json(&body)?.unwrap_or_default();

    let owner = match req.user_key.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse::<UserKey>()?,
        _ => caller.user_key,
    };

    let contacts = graph::list_contacts(state.store.as_ref(), owner).await?;
    Ok(Json(contacts))
}
