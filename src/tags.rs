//! Message tags.
//!
//! A message carries an ordered sequence of `(name, value)` string pairs.
//! The `Action` tag is always emitted first; caller-supplied tags follow in
//! the order given. Tag names are NOT deduplicated — duplicates pass through
//! unchanged, matching what the network accepts.

use serde::{Deserialize, Serialize};

use crate::types::{Error, Result};

/// A single `(name, value)` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse the `TAGS` input: a JSON array of `{name, value}` string pairs.
///
/// The shape is validated strictly after parsing; any mismatch (non-array
/// input, non-string fields, unknown keys) rejects with a validation error
/// rather than trusting a cast.
pub fn parse_tags(raw: &str) -> Result<Vec<Tag>> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| Error::validation(format!("failed to parse TAGS as JSON: {e}")))?;
    if !value.is_array() {
        return Err(Error::validation("TAGS must be a JSON array"));
    }
    serde_json::from_value(value).map_err(|e| {
        Error::validation(format!("TAGS entries must be {{name, value}} string pairs: {e}"))
    })
}

/// Compose the emitted tag sequence: `Action` first, then caller tags in
/// their original order.
pub fn with_action(action: &str, extra: &[Tag]) -> Vec<Tag> {
    let mut tags = Vec::with_capacity(extra.len() + 1);
    tags.push(Tag::new("Action", action));
    tags.extend_from_slice(extra);
    tags
}
