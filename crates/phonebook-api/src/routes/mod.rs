//! # API Route Modules
//!
//! - `verification` — unauthenticated number claim, code redemption and
//!   cancellation.
//! - `account` — the authenticated caller's identity (`/api/me`).
//! - `contacts` — address-book ingestion and one-hop listing
//!   (`/api/add-contacts`, `/api/contacts`).

pub mod account;
pub mod contacts;
pub mod verification;
