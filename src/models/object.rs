//! Represents an object (file) referenced by a storage notification.

/// Build the logical URI of an object, e.g. `s3://mybucket/mykey.gz`.
pub fn entity_path(bucket: &str, key: &str) -> String {
    format!("s3://{}/{}", bucket, key)
}

/// Identifies a single stored object as described by one event record.
///
/// Descriptors are built once per record and never mutated. The key is not
/// validated here; an empty key simply matches no classification rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Bucket holding the object.
    pub bucket: String,

    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Size in bytes, `None` when the notification did not carry one.
    /// An unknown size never satisfies the size threshold.
    pub size: Option<u64>,

    /// Version identifier, `None` for unversioned objects.
    pub version_id: Option<String>,
}

impl ObjectDescriptor {
    /// Create a descriptor. An empty `version_id` is treated as unversioned.
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        size: Option<u64>,
        version_id: Option<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size,
            version_id: version_id.filter(|v| !v.is_empty()),
        }
    }

    pub fn entity_path(&self) -> String {
        entity_path(&self.bucket, &self.key)
    }
}
