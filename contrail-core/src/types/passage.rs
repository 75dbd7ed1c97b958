//! Passages and their canonical identity.
//!
//! A [`Passage`] is the unit the similarity index hands back for a query. The
//! fusion engine never compares passages by address or by map iteration order:
//! it compares them by [`PassageIdentity`], a canonical rendering of the
//! content plus every metadata entry with object keys sorted at every depth.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Well-known metadata keys attached by the similarity index client.
pub mod metadata_keys {
    /// Source document name, without extension.
    pub const FILENAME: &str = "filename";
    /// Source document format (`pdf`, `markdown`, ...).
    pub const FILE_TYPE: &str = "file_type";
    /// Path of the source document at ingestion time.
    pub const FILE_PATH: &str = "file_path";
    /// Similarity score reported by the index.
    pub const SCORE: &str = "score";
    /// Character offset where the chunk starts in the source document.
    pub const CHUNK_START: &str = "chunk_start";
    /// Character offset where the chunk ends in the source document.
    pub const CHUNK_END: &str = "chunk_end";
}

/// Number of characters kept by [`Passage::preview`] in pipeline responses.
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// An immutable retrieval unit: passage text plus its source metadata.
///
/// Passages are constructed once by the retriever and only read afterwards;
/// the `with_*` methods consume `self` and are meant for construction.
///
/// # Examples
///
/// ```rust
/// use contrail_core::types::Passage;
///
/// let passage = Passage::new("Checked bags up to 23kg are free on long-haul flights.")
///     .with_metadata("filename", "baggage_policy")
///     .with_metadata("file_type", "pdf")
///     .with_score(0.82);
///
/// assert_eq!(passage.source(), "baggage_policy");
/// assert_eq!(passage.score(), Some(0.82));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    content: String,
    metadata: HashMap<String, Value>,
}

impl Passage {
    /// Create a passage with no metadata.
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Create a passage from content and a complete metadata map.
    pub fn with_metadata_map<S: Into<String>>(content: S, metadata: HashMap<String, Value>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach the similarity score reported by the index.
    #[must_use]
    pub fn with_score(self, score: f32) -> Self {
        self.with_metadata(metadata_keys::SCORE, f64::from(score))
    }

    /// Passage text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Source metadata.
    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Name of the source document, or `"unknown"` when the index did not report one.
    pub fn source(&self) -> &str {
        self.metadata
            .get(metadata_keys::FILENAME)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    /// Similarity score reported by the index, if any.
    #[allow(clippy::cast_possible_truncation)]
    pub fn score(&self) -> Option<f32> {
        self.metadata
            .get(metadata_keys::SCORE)
            .and_then(Value::as_f64)
            .map(|score| score as f32)
    }

    /// First `limit` characters of the content, followed by `...` when truncated.
    pub fn preview(&self, limit: usize) -> String {
        match self.content.char_indices().nth(limit) {
            Some((byte_index, _)) => format!("{}...", &self.content[..byte_index]),
            None => self.content.clone(),
        }
    }

    /// Canonical identity used to deduplicate passages across ranked lists.
    pub fn identity(&self) -> PassageIdentity {
        PassageIdentity::of(self)
    }
}

/// Canonical identity of a passage: content plus metadata, key order independent.
///
/// Two passages share an identity iff their content is byte-identical and
/// their metadata maps hold equal values under equal keys. The similarity
/// score is left out: it describes one retrieval of the passage, and the
/// same chunk found by two queries carries two different scores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassageIdentity(String);

impl PassageIdentity {
    /// Compute the identity of a passage.
    pub fn of(passage: &Passage) -> Self {
        let mut out = String::with_capacity(passage.content.len() + 64);
        out.push_str("{\"content\":");
        write_json_string(&mut out, &passage.content);
        out.push_str(",\"metadata\":");

        let mut keys: Vec<&String> = passage
            .metadata
            .keys()
            .filter(|key| key.as_str() != metadata_keys::SCORE)
            .collect();
        keys.sort();
        write_object(
            &mut out,
            keys.into_iter().map(|key| (key.as_str(), &passage.metadata[key])),
        );
        out.push('}');
        Self(out)
    }

    /// The canonical serialized form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn write_object<'a>(out: &mut String, entries: impl Iterator<Item = (&'a str, &'a Value)>) {
    out.push('{');
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_json_string(out, key);
        out.push(':');
        write_canonical(out, value);
    }
    out.push('}');
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&str, &Value)> =
                map.iter().map(|(k, v)| (k.as_str(), v)).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            write_object(out, entries.into_iter());
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::String(s) => write_json_string(out, s),
        scalar => {
            let _ = write!(out, "{scalar}");
        }
    }
}

fn write_json_string(out: &mut String, s: &str) {
    // Display on a string Value produces the escaped, quoted JSON form.
    let _ = write!(out, "{}", Value::String(s.to_owned()));
}

/// A match returned by a similarity index: text, metadata, and similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Stored passage text.
    pub text: String,
    /// Stored payload, excluding the text itself.
    pub metadata: HashMap<String, Value>,
    /// Similarity score, higher is closer.
    pub score: f32,
}

impl IndexMatch {
    /// Create a match.
    pub fn new<S: Into<String>>(text: S, metadata: HashMap<String, Value>, score: f32) -> Self {
        Self {
            text: text.into(),
            metadata,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_ignores_metadata_order() {
        let mut first = HashMap::new();
        first.insert("filename".to_string(), json!("refunds"));
        first.insert("file_type".to_string(), json!("pdf"));
        first.insert("extra".to_string(), json!({"b": 1, "a": [1, {"z": 0, "y": 1}]}));

        let mut second = HashMap::new();
        second.insert("extra".to_string(), json!({"a": [1, {"y": 1, "z": 0}], "b": 1}));
        second.insert("file_type".to_string(), json!("pdf"));
        second.insert("filename".to_string(), json!("refunds"));

        let a = Passage::with_metadata_map("Refunds take 7 days.", first);
        let b = Passage::with_metadata_map("Refunds take 7 days.", second);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_distinguishes_metadata_values() {
        let a = Passage::new("same text").with_metadata("filename", "a");
        let b = Passage::new("same text").with_metadata("filename", "b");
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_ignores_similarity_score() {
        let a = Passage::new("same text").with_score(0.5);
        let b = Passage::new("same text").with_score(0.6);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_escapes_content() {
        let a = Passage::new("quote \" and \\ backslash");
        assert!(a.identity().as_str().contains("\\\""));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let passage = Passage::new("é".repeat(250));
        let preview = passage.preview(DEFAULT_PREVIEW_CHARS);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), DEFAULT_PREVIEW_CHARS + 3);

        let short = Passage::new("short");
        assert_eq!(short.preview(DEFAULT_PREVIEW_CHARS), "short");
    }

    #[test]
    fn test_source_defaults_to_unknown() {
        assert_eq!(Passage::new("x").source(), "unknown");
    }
}
