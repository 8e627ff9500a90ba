//! Document and precedent records.
//!
//! Both are immutable inputs to a run: the document is supplied by the caller,
//! precedents come from the gold index mapping.

use serde::{Deserialize, Deserializer, Serialize};

/// The award document under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Identifier (doc_id or source filename)
    pub doc_id: String,

    /// Full cleaned text
    pub text: String,
}

impl DocumentRecord {
    pub fn new(doc_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            text: text.into(),
        }
    }
}

/// A curated gold-set case with known risk annotations.
///
/// Field names follow the gold mapping JSONL produced by the index builder,
/// which writes `null` for a gold document without a `doc_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedentRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub doc_id: String,

    /// Curator-assigned risk tags
    #[serde(rename = "riesgos", default, deserialize_with = "null_as_default")]
    pub risk_tags: Vec<String>,

    /// Curator note
    #[serde(rename = "nota_curador", default, deserialize_with = "null_as_default")]
    pub curator_note: String,

    /// Path of the source document in the gold corpus
    #[serde(rename = "filepath", default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PrecedentRecord {
    /// One-line rendering used inside Analyst prompts.
    pub fn render_line(&self) -> String {
        format!(
            "- (doc_id={}) riesgos={:?} nota={} file={}",
            self.doc_id,
            self.risk_tags,
            self.curator_note,
            self.source_path.as_deref().unwrap_or("None"),
        )
    }
}
