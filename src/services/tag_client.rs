//! The outward seam of the tagger: anything able to put a tag-set on an
//! object. Production uses the SQLite-backed session from `tag_store`; tests
//! swap in a recording double.

use crate::models::tag::{TagDecision, TagOutput};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Broad failure classes a tagging backend can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagErrorKind {
    PermissionDenied,
    NotFound,
    Throttled,
    Backend,
}

impl fmt::Display for TagErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TagErrorKind::PermissionDenied => "permission denied",
            TagErrorKind::NotFound => "not found",
            TagErrorKind::Throttled => "throttled",
            TagErrorKind::Backend => "backend error",
        };
        f.write_str(s)
    }
}

/// Failure reported by a `TagClient` or while opening one.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TagClientError {
    pub kind: TagErrorKind,
    pub message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TagClientError {
    pub fn new(kind: TagErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: TagErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<sqlx::Error> for TagClientError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::PoolTimedOut => TagErrorKind::Throttled,
            sqlx::Error::RowNotFound => TagErrorKind::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.message().to_ascii_lowercase().contains("readonly") =>
            {
                TagErrorKind::PermissionDenied
            }
            _ => TagErrorKind::Backend,
        };
        TagClientError::with_source(kind, "tag store request failed", err)
    }
}

/// Applies a single-tag decision to the object it targets.
///
/// Implementations replace the object's tag-set with the decision's tag.
/// Calls are made sequentially, one per decision.
#[async_trait]
pub trait TagClient: Send {
    async fn apply_tag(&mut self, decision: &TagDecision) -> Result<TagOutput, TagClientError>;
}

/// Opens a tagging session for one event invocation.
#[async_trait]
pub trait TagClientFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn TagClient>, TagClientError>;
}

#[cfg(test)]
pub mod testing {
    //! Recording test double for `TagClient`.

    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    /// Records every decision it receives. Optionally fails on the n-th call
    /// (zero based) with the configured error kind.
    #[derive(Clone, Default)]
    pub struct RecordingTagClient {
        pub calls: Arc<Mutex<Vec<TagDecision>>>,
        pub fail_on: Option<(usize, TagErrorKind)>,
    }

    impl RecordingTagClient {
        pub fn failing_on(call: usize, kind: TagErrorKind) -> Self {
            Self {
                calls: Arc::default(),
                fail_on: Some((call, kind)),
            }
        }

        pub fn recorded(&self) -> Vec<TagDecision> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TagClient for RecordingTagClient {
        async fn apply_tag(
            &mut self,
            decision: &TagDecision,
        ) -> Result<TagOutput, TagClientError> {
            let mut calls = self.calls.lock().unwrap();
            let idx = calls.len();
            calls.push(decision.clone());
            match self.fail_on {
                Some((n, kind)) if n == idx => Err(TagClientError::new(kind, "injected failure")),
                _ => Ok(TagOutput {
                    version_id: decision.version_id.clone(),
                    tagged_at: Utc::now(),
                }),
            }
        }
    }

    /// Hands out clones of one recording client, or fails to open at all.
    #[derive(Clone, Default)]
    pub struct RecordingFactory {
        pub client: RecordingTagClient,
        pub fail_open: bool,
    }

    #[async_trait]
    impl TagClientFactory for RecordingFactory {
        async fn open(&self) -> Result<Box<dyn TagClient>, TagClientError> {
            if self.fail_open {
                return Err(TagClientError::new(
                    TagErrorKind::Backend,
                    "could not open session",
                ));
            }
            Ok(Box::new(self.client.clone()))
        }
    }
}
