//! # Authentication Middleware
//!
//! Bearer session-token middleware for the `/api/*` routes.
//!
//! ## Token Format
//!
//! ```text
//! Authorization: Bearer <HS256 JWT>
//! ```
//!
//! The JWT carries `{user_key, iat, nbf, exp}` and is issued by
//! [`SessionIssuer`] on successful verification. Signature, `exp` and `nbf`
//! are checked with zero leeway.
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use phonebook_core::UserKey;
use phonebook_crypto::{CryptoError, SessionIssuer};

use crate::error::{AppError, ErrorBody, ErrorDetail};

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_key: UserKey,
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Auth configuration injected into request extensions.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: Arc<SessionIssuer>,
}

/// Validate the `Authorization: Bearer` token and inject [`CallerIdentity`].
///
/// Missing header, non-Bearer scheme, bad signature and expired token are
/// all rejected with 401 before the handler runs. A request without an
/// [`AuthConfig`] extension is rejected too.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(config) = request.extensions().get::<AuthConfig>().cloned() else {
        tracing::error!("auth middleware mounted without AuthConfig");
        return unauthorized_response("authentication is not configured");
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(token) => token.trim(),
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                return unauthorized_response("authorization header must use Bearer scheme");
            }
        },
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            return unauthorized_response("missing authorization header");
        }
    };

    match config.issuer.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(CallerIdentity {
                user_key: claims.user_key,
            });
            next.run(request).await
        }
        Err(CryptoError::Expired) => {
            tracing::warn!("authentication failed: expired session token");
            unauthorized_response("session token expired")
        }
        Err(e) => {
            tracing::warn!(reason = %e, "authentication failed: invalid session token");
            unauthorized_response("invalid session token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
