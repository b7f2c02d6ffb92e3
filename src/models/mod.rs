//! Core data models for the object tagger.
//!
//! Event payloads come in via `serde`, classification output and stored tags
//! go out as JSON or map to the `object_tags` table via `sqlx::FromRow`.

pub mod event;
pub mod object;
pub mod tag;
