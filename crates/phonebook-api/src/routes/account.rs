//! # Account API
//!
//! `GET /api/me` returns the authenticated caller's identity.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::resolver;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user_key: String,
    /// Verified number in E.164 form.
    pub number: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// GET /api/me — The caller's identity.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ErrorBody),
        (status = 404, description = "Identity no longer exists", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "account"
)]
async fn me(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<MeResponse>, AppError> {
    let user = resolver::get(state.store.as_ref(), caller.user_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", caller.user_key)))?;

    Ok(Json(MeResponse {
        user_key: user.key.to_string(),
        number: user.number.to_string(),
    }))
}
