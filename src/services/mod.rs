pub mod classifier;
pub mod tag_client;
pub mod tag_store;
pub mod tagging_service;
