//! S3 event-notification payloads delivered to the tagger.
//!
//! Only the fields the classifier needs are modelled; everything else in the
//! notification (request parameters, owner identity, sequencer, ...) is
//! ignored during deserialization.

use super::object::ObjectDescriptor;
use serde::{Deserialize, Serialize};

/// A batch of object-change notifications.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

/// One object-change notification.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    /// Event type, e.g. `ObjectCreated:Put`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    pub s3: S3Entity,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct S3Bucket {
    pub name: String,
}

/// Object section of a record. Delete notifications omit `size`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct S3Object {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl S3EventRecord {
    /// Derive the descriptor the classifier works on.
    pub fn descriptor(&self) -> ObjectDescriptor {
        ObjectDescriptor::new(
            self.s3.bucket.name.clone(),
            self.s3.object.key.clone(),
            self.s3.object.size,
            self.s3.object.version_id.clone(),
        )
    }
}

#[cfg(test)]
impl S3Event {
    /// Build a single-record event.
    pub fn single(bucket: &str, key: &str, size: u64) -> Self {
        Self {
            records: vec![S3EventRecord {
                event_name: Some("ObjectCreated:Put".into()),
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.to_string(),
                    },
                    object: S3Object {
                        key: key.to_string(),
                        size: Some(size),
                        version_id: None,
                    },
                },
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_notification_json() {
        let raw = r#"{
            "Records": [
                {
                    "eventVersion": "2.1",
                    "eventSource": "aws:s3",
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "s3SchemaVersion": "1.0",
                        "bucket": { "name": "reads", "arn": "arn:aws:s3:::reads" },
                        "object": {
                            "key": "run1/sample.fastq.gz",
                            "size": 1024,
                            "eTag": "abc",
                            "versionId": "3HL4kqtJlcpXroDTDmJ"
                        }
                    }
                },
                {
                    "eventName": "ObjectRemoved:Delete",
                    "s3": {
                        "bucket": { "name": "reads" },
                        "object": { "key": "old.bam", "versionId": "" }
                    }
                }
            ]
        }"#;

        let event: S3Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.records.len(), 2);

        let first = event.records[0].descriptor();
        assert_eq!(first.bucket, "reads");
        assert_eq!(first.key, "run1/sample.fastq.gz");
        assert_eq!(first.size, Some(1024));
        assert_eq!(first.version_id.as_deref(), Some("3HL4kqtJlcpXroDTDmJ"));

        let second = event.records[1].descriptor();
        assert_eq!(second.size, None);
        assert_eq!(second.version_id, None);
    }

    #[test]
    fn missing_records_is_empty_batch() {
        let event: S3Event = serde_json::from_str("{}").unwrap();
        assert!(event.records.is_empty());
    }
}
