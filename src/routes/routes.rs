//! Defines routes for event delivery and tag inspection.
//!
//! ## Structure
//! - `POST /events`               — deliver one S3 event batch for tagging
//! - `GET  /tags/{bucket}/{*key}` — read an object's stored tag-set
//!   (optional `?versionId=`)
//! - `GET  /healthz`, `GET /readyz` — liveness and readiness probes
//!
//! The wildcard `*key` allows nested keys like `runs/2025/sample.fastq.gz`.

use crate::handlers::{
    AppState,
    event_handlers::receive_event,
    health_handlers::{healthz, readyz},
    tag_handlers::get_object_tags,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all tagger routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/events", post(receive_event))
        .route("/tags/{bucket}/{*key}", get(get_object_tags))
}
