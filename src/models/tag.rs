//! Tags written to objects and the results reported back to the caller.

use super::object::entity_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tag key carrying the classification label.
pub const FILETYPE_KEY: &str = "filetype";

/// Label applied to unclassified objects at or above the size threshold.
pub const LARGEFILE_LABEL: &str = "largefile";

/// Status message returned when a whole batch was processed.
pub const COMPLETED_MESSAGE: &str = "completed successfully";

/// A single key/value tag.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn filetype(label: impl Into<String>) -> Self {
        Self {
            key: FILETYPE_KEY.to_string(),
            value: label.into(),
        }
    }
}

/// The one mutation the classifier emits: set `tag` on the target object.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagDecision {
    pub bucket: String,
    pub key: String,

    /// Never `Some("")`; unversioned targets carry `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    pub tag: Tag,
}

impl TagDecision {
    pub fn entity_path(&self) -> String {
        entity_path(&self.bucket, &self.key)
    }
}

/// What a tagging backend reports after a successful write.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagOutput {
    pub version_id: Option<String>,
    pub tagged_at: DateTime<Utc>,
}

/// Summary of one processed event batch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BatchResult {
    /// Number of tags successfully applied.
    pub count: usize,
    pub message: String,
}

impl BatchResult {
    pub fn completed(count: usize) -> Self {
        Self {
            count,
            message: COMPLETED_MESSAGE.to_string(),
        }
    }
}

/// A tag persisted on an object, as stored in the `object_tags` table.
///
/// `version_id` is stored as an empty string for unversioned objects so the
/// composite primary key stays usable; it is converted back to `None` when
/// exposed through the API.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct StoredTag {
    pub bucket: String,
    pub object_key: String,
    pub version_id: String,
    pub tag_key: String,
    pub tag_value: String,
    pub tagged_at: DateTime<Utc>,
}

/// Tag-set of one object as returned by `GET /tags/{bucket}/{*key}`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTagging {
    pub bucket: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub tags: Vec<Tag>,
}

impl ObjectTagging {
    pub fn from_rows(
        bucket: &str,
        key: &str,
        version_id: Option<String>,
        rows: Vec<StoredTag>,
    ) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            version_id,
            tags: rows
                .into_iter()
                .map(|row| Tag {
                    key: row.tag_key,
                    value: row.tag_value,
                })
                .collect(),
        }
    }
}
