//! Document selection from a cleaned-records JSONL file.
//!
//! Each line is `{"archivo": ..., "texto_limpio": ..., "doc_id": ...}` as
//! written by the text-cleaning stage; lines that do not parse are skipped.

use std::path::Path;

use dictamen_core::{DocumentRecord, Error, Result};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub archivo: Option<String>,
    #[serde(default)]
    pub texto_limpio: Option<String>,
    #[serde(default, deserialize_with = "id_as_string")]
    pub doc_id: Option<String>,
}

/// Accept numeric as well as string ids.
fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl SourceRecord {
    /// Identifier used for the run: `doc_id`, else `archivo`, else the base name.
    pub fn identifier(&self) -> String {
        self.doc_id
            .clone()
            .or_else(|| self.archivo.clone())
            .unwrap_or_else(|| self.base_name())
    }

    /// File-system-safe base name for the output files.
    pub fn base_name(&self) -> String {
        base_name(self.archivo.as_deref().unwrap_or("acta"))
    }

    pub fn text(&self) -> &str {
        self.texto_limpio.as_deref().unwrap_or("")
    }

    pub fn to_document(&self) -> DocumentRecord {
        DocumentRecord::new(self.identifier(), self.text())
    }
}

/// Filters applied, in order, to pick one record.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    /// Exact `doc_id`
    pub doc_id: Option<String>,
    /// Substring of `archivo` (case-sensitive)
    pub pattern: Option<String>,
    /// Position among the remaining candidates (0-based)
    pub index_pos: Option<usize>,
}

pub fn parse_records(content: &str) -> Vec<SourceRecord> {
    let mut records = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<SourceRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => debug!(line = line_no + 1, "Skipping unreadable record: {e}"),
        }
    }
    records
}

pub fn load_records(path: &Path) -> Result<Vec<SourceRecord>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::data(format!("cannot read {}: {e}", path.display())))?;
    let records = parse_records(&content);
    if records.is_empty() {
        return Err(Error::data(format!(
            "{} is empty or has no readable records",
            path.display()
        )));
    }
    Ok(records)
}

/// Pick one record. An out-of-range `index_pos` falls back to the first candidate.
pub fn select(records: Vec<SourceRecord>, selector: &Selector) -> Result<SourceRecord> {
    let mut candidates: Vec<SourceRecord> = records;

    if let Some(id) = &selector.doc_id {
        candidates.retain(|r| r.doc_id.as_deref() == Some(id.as_str()));
    }
    if let Some(pattern) = &selector.pattern {
        candidates.retain(|r| r.archivo.as_deref().is_some_and(|a| a.contains(pattern.as_str())));
    }

    if candidates.is_empty() {
        return Err(Error::data("no matching records (use --match or --doc-id)"));
    }

    let position = match selector.index_pos {
        Some(pos) if pos < candidates.len() => pos,
        Some(pos) => {
            warn!(pos, candidates = candidates.len(), "--index-pos out of range, using the first match");
            0
        }
        None => 0,
    };
    let record = candidates.swap_remove(position);

    if record.text().trim().is_empty() {
        return Err(Error::data(format!(
            "record '{}' has no 'texto_limpio' content",
            record.identifier()
        )));
    }
    Ok(record)
}

/// Last path component of `archivo` without its extension, with characters
/// outside `[A-Za-z0-9_.-]` collapsed to `_`.
pub fn base_name(archivo: &str) -> String {
    let normalized = archivo.replace('\\', "/");
    let file = normalized.rsplit('/').next().unwrap_or("");
    let stem = match file.rfind('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    };

    let mut cleaned = String::with_capacity(stem.len());
    let mut in_run = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
            cleaned.push(c);
            in_run = false;
        } else if !in_run {
            cleaned.push('_');
            in_run = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "acta".to_string()
    } else {
        trimmed.to_string()
    }
}
