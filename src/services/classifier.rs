//! src/services/classifier.rs
//!
//! Classifier — maps an object descriptor to at most one `filetype` tag.
//! Pure and deterministic: no I/O, no shared mutable state. Rules are
//! evaluated in declaration order and the first match wins; objects that
//! match nothing fall back to a size check.

use crate::models::{
    object::ObjectDescriptor,
    tag::{LARGEFILE_LABEL, Tag, TagDecision},
};
use regex::Regex;
use thiserror::Error;

pub const MB: u64 = 1024 * 1024;

/// Objects at or above this size are tagged `largefile` when no rule matches.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 50 * MB;

/// Built-in rules, in priority order.
pub const DEFAULT_RULES: [(&str, &str); 2] = [
    ("fastq", r"\.fastq(\.gz)?$"),
    ("bam", r"\.bam$"),
];

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule `{0}` must be of the form label=pattern")]
    Malformed(String),
    #[error("rule label must not be empty")]
    EmptyLabel,
    #[error("rule label `{0}` is reserved for size-based classification")]
    ReservedLabel(String),
    #[error("rule label `{0}` is declared more than once")]
    DuplicateLabel(String),
    #[error("invalid pattern for rule `{label}`")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// A named pattern matched against object keys.
#[derive(Clone, Debug)]
pub struct ClassificationRule {
    label: String,
    pattern: Regex,
}

impl ClassificationRule {
    pub fn new(label: impl Into<String>, pattern: &str) -> Result<Self, RuleError> {
        let label = label.into();
        if label.is_empty() {
            return Err(RuleError::EmptyLabel);
        }
        if label == LARGEFILE_LABEL {
            return Err(RuleError::ReservedLabel(label));
        }
        let pattern = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            label: label.clone(),
            source,
        })?;
        Ok(Self { label, pattern })
    }

    /// Parse the `label=pattern` form used on the command line and in
    /// `OBJECT_TAGGER_RULES`. Only the first `=` separates; the pattern may
    /// contain more.
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let (label, pattern) = raw
            .split_once('=')
            .ok_or_else(|| RuleError::Malformed(raw.to_string()))?;
        let label = label.trim();
        if pattern.is_empty() {
            return Err(RuleError::Malformed(raw.to_string()));
        }
        Self::new(label, pattern)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, key: &str) -> bool {
        self.pattern.is_match(key)
    }
}

/// Ordered rule list with unique labels.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ClassificationRule>) -> Result<Self, RuleError> {
        for (idx, rule) in rules.iter().enumerate() {
            if rules[..idx].iter().any(|prev| prev.label == rule.label) {
                return Err(RuleError::DuplicateLabel(rule.label.clone()));
            }
        }
        Ok(Self { rules })
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rules = pairs
            .into_iter()
            .map(|(label, pattern)| ClassificationRule::new(label, pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    /// The built-in `fastq` and `bam` rules.
    pub fn defaults() -> Result<Self, RuleError> {
        Self::from_pairs(DEFAULT_RULES)
    }

    /// First rule, in declaration order, whose pattern matches `key`.
    pub fn first_match(&self, key: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|rule| rule.matches(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassificationRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// Decides which `filetype` tag, if any, an object should carry.
#[derive(Clone, Debug)]
pub struct Classifier {
    rules: RuleSet,
    large_file_threshold: u64,
}

impl Classifier {
    pub fn new(rules: RuleSet, large_file_threshold: u64) -> Self {
        Self {
            rules,
            large_file_threshold,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn large_file_threshold(&self) -> u64 {
        self.large_file_threshold
    }

    /// Pick the label for an object.
    ///
    /// A matching rule wins regardless of size. Otherwise objects of a known
    /// size of at least `large_file_threshold` bytes are `largefile`, and
    /// everything else gets no label.
    pub fn label_for(&self, obj: &ObjectDescriptor) -> Option<&str> {
        if let Some(rule) = self.rules.first_match(&obj.key) {
            return Some(rule.label());
        }
        match obj.size {
            Some(size) if size >= self.large_file_threshold => Some(LARGEFILE_LABEL),
            _ => None,
        }
    }

    /// Build the tag decision for an object, or `None` if it stays untagged.
    pub fn classify(&self, obj: &ObjectDescriptor) -> Option<TagDecision> {
        let label = self.label_for(obj)?;
        Some(TagDecision {
            bucket: obj.bucket.clone(),
            key: obj.key.clone(),
            // the tagging backend must never see an empty version id
            version_id: obj.version_id.clone().filter(|v| !v.is_empty()),
            tag: Tag::filetype(label),
        })
    }
}
