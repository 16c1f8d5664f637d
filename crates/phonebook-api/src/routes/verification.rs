//! # Phone Number Verification API
//!
//! Unauthenticated claim flow:
//!
//! 1. `POST /request-verification` canonicalizes the number and opens an
//!    attempt; the code goes out through [`CodeDelivery`](crate::delivery::CodeDelivery).
//! 2. `POST /verify` redeems the code for a session token bound to the
//!    number's identity, creating the identity on first claim.
//! 3. `POST /cancel-verification` drops a pending attempt.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use phonebook_core::{AttemptKey, RegionCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::ledger::{self, VerifyOutcome};
use crate::resolver;
use crate::state::AppState;

/// Claim a phone number.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestVerificationRequest {
    /// Phone number in any common notation.
    pub number: String,
    /// ISO 3166-1 alpha-2 region used for national-format numbers.
    /// Defaults to the server's configured region.
    #[serde(default)]
    pub country_code: Option<String>,
}

impl Validate for RequestVerificationRequest {
    fn validate(&self) -> Result<(), String> {
        if self.number.trim().is_empty() {
            return Err("number must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestVerificationResponse {
    pub message: String,
    /// Attempt key to pass to `/verify` or `/cancel-verification`.
    pub id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelVerificationRequest {
    pub attempt_key: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub attempt_key: String,
    /// The six-digit code that was delivered.
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub message: String,
    /// Bearer session token for `/api/*`.
    pub token: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request-verification", post(request_verification))
        .route("/cancel-verification", post(cancel_verification))
        .route("/verify", post(verify))
}

/// A key that does not parse cannot name a stored attempt.
fn parse_attempt_key(raw: &str) -> Result<AttemptKey, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("verification attempt {raw}")))
}

/// POST /request-verification — Start claiming a phone number.
#[utoipa::path(
    post,
    path = "/request-verification",
    request_body = RequestVerificationRequest,
    responses(
        (status = 200, description = "Code issued", body = RequestVerificationResponse),
        (status = 400, description = "Unparseable or region-invalid number", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
async fn request_verification(
    State(state): State<AppState>,
    body: Result<Json<RequestVerificationRequest>, JsonRejection>,
) -> Result<Json<RequestVerificationResponse>, AppError> {
    let req = extract_validated_json(body)?;

    let region = match req.country_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => RegionCode::new(code)?,
        _ => state.config.default_region.clone(),
    };

    let canonical = state.canonicalizer.canonicalize(&req.number, &region)?;
    if !canonical.valid_for_region {
        return Err(AppError::Validation(format!(
            "number is not a valid phone number for region {region}"
        )));
    }

    let key = ledger::create_attempt(
        state.store.as_ref(),
        state.delivery.as_ref(),
        canonical.number,
        Utc::now(),
    )
    .await?;

    Ok(Json(RequestVerificationResponse {
        message: "Verification code sent".to_string(),
        id: key.to_string(),
    }))
}

/// POST /cancel-verification — Drop a pending attempt.
#[utoipa::path(
    post,
    path = "/cancel-verification",
    request_body = CancelVerificationRequest,
    responses(
        (status = 200, description = "Attempt removed", body = MessageResponse),
        (status = 404, description = "No such attempt", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
async fn cancel_verification(
    State(state): State<AppState>,
    body: Result<Json<CancelVerificationRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let req = extract_json(body)?;
    let key = parse_attempt_key(&req.attempt_key)?;
    ledger::cancel_attempt(state.store.as_ref(), key).await?;
    Ok(Json(MessageResponse::new("Verification canceled")))
}

/// POST /verify — Redeem a code for a session token.
#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Number verified", body = VerifyResponse),
        (status = 400, description = "Wrong or expired code", body = crate::error::ErrorBody),
        (status = 404, description = "No such attempt", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
async fn verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let req = extract_json(body)?;
    let key = parse_attempt_key(&req.attempt_key)?;

    let number = match ledger::verify(state.store.as_ref(), key, &req.code, Utc::now()).await? {
        VerifyOutcome::Accepted { number } => number,
        VerifyOutcome::Expired => {
            return Err(AppError::Validation("verification code expired".to_string()))
        }
        VerifyOutcome::Mismatch => {
            return Err(AppError::Validation("invalid verification code".to_string()))
        }
    };

    let user_key = resolver::resolve(state.store.as_ref(), &number).await?;
    let token = state.sessions.issue(user_key)?;
    tracing::info!(%user_key, attempt_key = %key, "number verified, session issued");

    Ok(Json(VerifyResponse {
        message: "User verified".to_string(),
        token,
    }))
}
