//! Router-level tests: the full HTTP surface over the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use phonebook_api::delivery::{CodeDelivery, DeliveryError};
use phonebook_api::state::{AppConfig, AppState};
use phonebook_api::store::MemoryStore;
use phonebook_core::{AttemptKey, CanonicalNumber, UserKey, VerificationCode};
use phonebook_crypto::SessionSecret;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "integration-secret-integration-00";

/// Captures issued codes instead of sending them.
#[derive(Default)]
struct Outbox {
    codes: Mutex<HashMap<String, String>>,
}

impl Outbox {
    fn code_for(&self, attempt: &str) -> String {
        self.codes
            .lock()
            .get(attempt)
            .cloned()
            .unwrap_or_else(|| panic!("no code captured for {attempt}"))
    }
}

#[async_trait]
impl CodeDelivery for Outbox {
    async fn deliver(
        &self,
        attempt: AttemptKey,
        _number: &CanonicalNumber,
        code: &VerificationCode,
    ) -> Result<(), DeliveryError> {
        self.codes
            .lock()
            .insert(attempt.to_string(), code.as_str().to_string());
        Ok(())
    }
}

struct Harness {
    app: Router,
    state: AppState,
    store: MemoryStore,
    outbox: Arc<Outbox>,
}

fn harness() -> Harness {
    let store = MemoryStore::new();
    let outbox = Arc::new(Outbox::default());
    let config = AppConfig::new(SessionSecret::new(SECRET).unwrap());
    let state = AppState::new(config, Arc::new(store.clone()))
        .unwrap()
        .with_delivery(outbox.clone());
    Harness {
        app: phonebook_api::app(state.clone()),
        state,
        store,
        outbox,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Claim `number` (Swedish format) and return a session token.
async fn sign_in(h: &Harness, number: &str) -> String {
    let (status, body) = send(
        &h.app,
        "POST",
        "/request-verification",
        None,
        Some(json!({ "number": number, "country_code": "SE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let attempt = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &h.app,
        "POST",
        "/verify",
        None,
        Some(json!({ "attempt_key": attempt, "code": h.outbox.code_for(&attempt) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

// -- Probes ---------------------------------------------------------------

#[tokio::test]
async fn probes_answer_without_auth() {
    let h = harness();
    assert_eq!(
        send(&h.app, "GET", "/ping", None, None).await,
        (StatusCode::OK, Value::String("pong".into()))
    );
    assert_eq!(
        send(&h.app, "GET", "/health/liveness", None, None).await,
        (StatusCode::OK, Value::String("ok".into()))
    );
    assert_eq!(
        send(&h.app, "GET", "/health/readiness", None, None).await,
        (StatusCode::OK, Value::String("ready".into()))
    );
}

#[tokio::test]
async fn openapi_document_served() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/verify"].is_object());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/ping")
                .header(header::ORIGIN, "https://example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

// -- Verification flow ------------------------------------------------------

#[tokio::test]
async fn full_flow_claim_verify_and_build_graph() {
    let h = harness();
    let token = sign_in(&h, "070-812 34 56").await;

    let (status, me) = send(&h.app, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["number"], "+46708123456");

    let (status, body) = send(
        &h.app,
        "POST",
        "/api/add-contacts",
        Some(&token),
        Some(json!({ "contacts": [
            { "country_code": "se", "number": "0701234567", "name": "Alice" },
            { "country_code": "SE", "number": "+1 201-555-0123", "name": "Skipped" },
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Contacts added");

    // Same contact under a new label renames the single edge.
    send(
        &h.app,
        "POST",
        "/api/add-contacts",
        Some(&token),
        Some(json!({ "contacts": [
            { "country_code": "SE", "number": "070 123 45 67", "name": "Bob" },
        ]})),
    )
    .await;

    let (status, contacts) = send(&h.app, "GET", "/api/contacts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = contacts.as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["name"], "Bob");

    // The contact's identity is the one a later claim of that number gets.
    let bob_token = sign_in(&h, "0701234567").await;
    let (_, bob) = send(&h.app, "GET", "/api/me", Some(&bob_token), None).await;
    assert_eq!(contacts[0]["user_key"], bob["user_key"]);
    assert_eq!(h.store.user_count(), 2);
}

#[tokio::test]
async fn second_claim_of_same_number_keeps_identity() {
    let h = harness();
    let first = sign_in(&h, "0708123456").await;
    let second = sign_in(&h, "+46 70 812 34 56").await;

    let (_, a) = send(&h.app, "GET", "/api/me", Some(&first), None).await;
    let (_, b) = send(&h.app, "GET", "/api/me", Some(&second), None).await;
    assert_eq!(a["user_key"], b["user_key"]);
}

#[tokio::test]
async fn missing_country_code_uses_default_region() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        "POST",
        "/request-verification",
        None,
        Some(json!({ "number": "0708123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Verification code sent");
    assert_eq!(h.store.attempt_count(), 1);
}

#[tokio::test]
async fn unparseable_number_is_400() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        "POST",
        "/request-verification",
        None,
        Some(json!({ "number": "call me maybe", "country_code": "SE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(h.store.attempt_count(), 0);
}

#[tokio::test]
async fn region_invalid_number_is_400() {
    let h = harness();
    let (status, _) = send(
        &h.app,
        "POST",
        "/request-verification",
        None,
        Some(json!({ "number": "+1 201-555-0123", "country_code": "SE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.store.attempt_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/verify")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_code_is_400_and_retryable() {
    let h = harness();
    let (_, body) = send(
        &h.app,
        "POST",
        "/request-verification",
        None,
        Some(json!({ "number": "0708123456", "country_code": "SE" })),
    )
    .await;
    let attempt = body["id"].as_str().unwrap().to_string();
    let code = h.outbox.code_for(&attempt);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = send(
        &h.app,
        "POST",
        "/verify",
        None,
        Some(json!({ "attempt_key": attempt, "code": wrong })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &h.app,
        "POST",
        "/verify",
        None,
        Some(json!({ "attempt_key": attempt, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User verified");

    // Single use.
    let (status, _) = send(
        &h.app,
        "POST",
        "/verify",
        None,
        Some(json!({ "attempt_key": attempt, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn padded_code_is_rejected_and_attempt_survives() {
    let h = harness();
    let (_, body) = send(
        &h.app,
        "POST",
        "/request-verification",
        None,
        Some(json!({ "number": "0708123456", "country_code": "SE" })),
    )
    .await;
    let attempt = body["id"].as_str().unwrap().to_string();
    let code = h.outbox.code_for(&attempt);

    for padded in [format!("  {code}\n"), format!("{code} "), format!("\t{code}")] {
        let (status, body) = send(
            &h.app,
            "POST",
            "/verify",
            None,
            Some(json!({ "attempt_key": attempt, "code": padded })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{padded:?} accepted: {body}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
    assert_eq!(h.store.attempt_count(), 1);

    let (status, _) = send(
        &h.app,
        "POST",
        "/verify",
        None,
        Some(json!({ "attempt_key": attempt, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cancel_then_verify_is_404() {
    let h = harness();
    let (_, body) = send(
        &h.app,
        "POST",
        "/request-verification",
        None,
        Some(json!({ "number": "0708123456", "country_code": "SE" })),
    )
    .await;
    let attempt = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &h.app,
        "POST",
        "/cancel-verification",
        None,
        Some(json!({ "attempt_key": attempt })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification canceled");

    let (status, _) = send(
        &h.app,
        "POST",
        "/verify",
        None,
        Some(json!({ "attempt_key": attempt, "code": h.outbox.code_for(&attempt) })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_or_malformed_attempt_is_404() {
    let h = harness();
    for key in [AttemptKey::new().to_string(), "not-a-key".to_string()] {
        let (status, body) = send(
            &h.app,
            "POST",
            "/cancel-verification",
            None,
            Some(json!({ "attempt_key": key })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{key}");
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

// -- Authenticated surface --------------------------------------------------

#[tokio::test]
async fn api_routes_require_bearer_token() {
    let h = harness();
    for (method, uri) in [
        ("GET", "/api/me"),
        ("GET", "/api/contacts"),
        ("POST", "/api/add-contacts"),
    ] {
        let (status, body) = send(&h.app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = send(&h.app, method, uri, Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn token_for_vanished_user_gets_404_on_me() {
    let h = harness();
    let token = h.state.sessions.issue(UserKey::new()).unwrap();
    let (status, _) = send(&h.app, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unparseable_contact_aborts_batch_after_earlier_items() {
    let h = harness();
    let token = sign_in(&h, "0708123456").await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/api/add-contacts",
        Some(&token),
        Some(json!({ "contacts": [
            { "country_code": "SE", "number": "0701234567", "name": "Alice" },
            { "country_code": "SE", "number": "call me maybe", "name": "Nobody" },
            { "country_code": "SE", "number": "0707654321", "name": "Carol" },
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, contacts) = send(&h.app, "GET", "/api/contacts", Some(&token), None).await;
    let names: Vec<_> = contacts
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alice".to_string()]);
}

#[tokio::test]
async fn blank_region_skips_international_contact_and_keeps_going() {
    let h = harness();
    let token = sign_in(&h, "0708123456").await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/api/add-contacts",
        Some(&token),
        Some(json!({ "contacts": [
            { "country_code": "", "number": "+46701234567", "name": "Blank" },
            { "country_code": "QQ", "number": "+46701234568", "name": "Unknown" },
            { "country_code": "SE", "number": "0708654321", "name": "Carol" },
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, contacts) = send(&h.app, "GET", "/api/contacts", Some(&token), None).await;
    let names: Vec<_> = contacts
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Carol".to_string()]);
}

#[tokio::test]
async fn blank_region_with_national_number_aborts_batch() {
    let h = harness();
    let token = sign_in(&h, "0708123456").await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/api/add-contacts",
        Some(&token),
        Some(json!({ "contacts": [
            { "country_code": "", "number": "0708654321", "name": "Carol" },
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(h.store.edge_count(), 0);
}

#[tokio::test]
async fn contacts_of_another_user_by_key() {
    let h = harness();
    let alice = sign_in(&h, "0708123456").await;
    let bob = sign_in(&h, "0701234567").await;

    send(
        &h.app,
        "POST",
        "/api/add-contacts",
        Some(&bob),
        Some(json!({ "contacts": [
            { "country_code": "SE", "number": "0707654321", "name": "Carol" },
        ]})),
    )
    .await;
    let (_, bob_me) = send(&h.app, "GET", "/api/me", Some(&bob), None).await;

    let (status, contacts) = send(
        &h.app,
        "GET",
        "/api/contacts",
        Some(&alice),
        Some(json!({ "user_key": bob_me["user_key"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contacts[0]["name"], "Carol");

    // Alice's own list is empty, which is not an error.
    let (status, own) = send(&h.app, "GET", "/api/contacts", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own, json!([]));
}

#[tokio::test]
async fn contacts_of_unknown_or_malformed_owner() {
    let h = harness();
    let token = sign_in(&h, "0708123456").await;

    let (status, _) = send(
        &h.app,
        "GET",
        "/api/contacts",
        Some(&token),
        Some(json!({ "user_key": UserKey::new().to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &h.app,
        "GET",
        "/api/contacts",
        Some(&token),
        Some(json!({ "user_key": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
