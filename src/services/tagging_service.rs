//! src/services/tagging_service.rs
//!
//! TaggingService — runs one event batch through the classifier and applies
//! the resulting tags through an injected `TagClient`. Records are handled
//! strictly in order, one external call at a time, and the first failed call
//! aborts the rest of the batch. Already-applied tags are not rolled back.

use crate::{
    models::{
        event::{S3Event, S3EventRecord},
        tag::BatchResult,
    },
    services::{
        classifier::Classifier,
        tag_client::{TagClient, TagClientError, TagClientFactory, TagErrorKind},
    },
};
use thiserror::Error;
use tracing::{Instrument, debug, error, info_span};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApplyError {
    /// No session could be opened; no record was processed.
    #[error("tagging session construction failed")]
    Setup(#[source] TagClientError),
    /// Tagging one object failed; the remaining records were skipped.
    #[error("put object tagging failed ({path})")]
    Tagging {
        path: String,
        #[source]
        source: TagClientError,
    },
}

impl ApplyError {
    pub fn kind(&self) -> TagErrorKind {
        match self {
            ApplyError::Setup(source) | ApplyError::Tagging { source, .. } => source.kind,
        }
    }

    /// Path of the object whose tagging failed, if the failure was per-record.
    pub fn path(&self) -> Option<&str> {
        match self {
            ApplyError::Tagging { path, .. } => Some(path),
            ApplyError::Setup(_) => None,
        }
    }

    /// Render the error and all of its sources as `outer: inner: ...`.
    pub fn context_chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

/// Classifies and tags the objects of incoming events.
///
/// Holds only read-only configuration, so one instance is shared by every
/// invocation.
#[derive(Clone, Debug)]
pub struct TaggingService {
    classifier: Classifier,
    verbose: bool,
}

impl TaggingService {
    pub fn new(classifier: Classifier, verbose: bool) -> Self {
        Self {
            classifier,
            verbose,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Apply tags for every record of a batch.
    ///
    /// Returns the number of tags applied, or the first failure wrapped with
    /// the failing object's path. Records without a decision are skipped and
    /// not counted.
    pub async fn apply_batch(
        &self,
        records: &[S3EventRecord],
        client: &mut dyn TagClient,
    ) -> Result<BatchResult, ApplyError> {
        let mut tags_applied = 0;
        for record in records {
            let obj = record.descriptor();
            let Some(decision) = self.classifier.classify(&obj) else {
                debug!("no filetype for {}", obj.entity_path());
                continue;
            };

            let output = client
                .apply_tag(&decision)
                .await
                .map_err(|source| ApplyError::Tagging {
                    path: obj.entity_path(),
                    source,
                })?;
            debug!(
                "successfully applied {}={} to {} ({:?})",
                decision.tag.key,
                decision.tag.value,
                decision.entity_path(),
                output
            );
            tags_applied += 1;
        }
        Ok(BatchResult::completed(tags_applied))
    }

    /// Full event entry point: open a tagging session, then apply the batch.
    pub async fn handle_event(
        &self,
        event: &S3Event,
        factory: &dyn TagClientFactory,
    ) -> Result<BatchResult, ApplyError> {
        let span = info_span!("event", invocation_id = %Uuid::new_v4());
        async move {
            if self.verbose {
                debug!("{}", debug_marshal(event));
            }

            let mut client = factory.open().await.map_err(ApplyError::Setup)?;
            let result = self.apply_batch(&event.records, &mut *client).await;
            match &result {
                Ok(summary) => debug!(
                    "processed {} records, applied {} tags",
                    event.records.len(),
                    summary.count
                ),
                Err(err) => error!(
                    path = err.path().unwrap_or("-"),
                    "event handler failed: {}",
                    err.context_chain()
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

fn debug_marshal(event: &S3Event) -> String {
    serde_json::to_string_pretty(event)
        .unwrap_or_else(|err| format!("<MARSHAL ERROR: {}> {:?}", err, event))
}
