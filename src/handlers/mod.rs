//! HTTP handlers and the state they share.

use crate::services::{tag_store::TagStore, tagging_service::TaggingService};
use std::sync::Arc;

pub mod event_handlers;
pub mod health_handlers;
pub mod tag_handlers;

/// Shared handler state: read-only tagging configuration plus the tag store.
#[derive(Clone)]
pub struct AppState {
    pub tagging: Arc<TaggingService>,
    pub store: TagStore,
}

impl AppState {
    pub fn new(tagging: TaggingService, store: TagStore) -> Self {
        Self {
            tagging: Arc::new(tagging),
            store,
        }
    }
}
