//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Phonebook API",
        version = "0.1.0",
        description = "Phone-number verification, identity resolution and contact-graph ingestion.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Verification
        crate::routes::verification::request_verification,
        crate::routes::verification::cancel_verification,
        crate::routes::verification::verify,
        // Account
        crate::routes::account::me,
        // Contacts
        crate::routes::contacts::add_contacts,
        crate::routes::contacts::list_contacts,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::graph::ContactView,
        crate::routes::verification::RequestVerificationRequest,
        crate::routes::verification::RequestVerificationResponse,
        crate::routes::verification::CancelVerificationRequest,
        crate::routes::verification::VerifyRequest,
        crate::routes::verification::VerifyResponse,
        crate::routes::verification::MessageResponse,
        crate::routes::account::MeResponse,
        crate::routes::contacts::ContactInput,
        crate::routes::contacts::AddContactsRequest,
        crate::routes::contacts::ListContactsRequest,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "verification", description = "Phone number claim and verification"),
        (name = "account", description = "Authenticated caller identity"),
        (name = "contacts", description = "Contact graph ingestion and listing"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` JWT security scheme referenced by `/api/*` paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
