//! # HTTP Middleware
//!
//! Tower layers shared by every route: request tracing.

pub mod tracing_layer;
