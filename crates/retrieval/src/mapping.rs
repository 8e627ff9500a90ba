//! Gold mapping: index position → precedent record.

use std::path::Path;

use dictamen_core::{PrecedentRecord, RetrievalError};
use serde::Deserialize;
use tracing::warn;

#[derive(Deserialize)]
struct MappingRow {
    #[serde(default)]
    idx: Option<usize>,
    #[serde(flatten)]
    record: PrecedentRecord,
}

/// Precedents addressed by index position.
///
/// A row sits at its `idx`. Positions no row claims are holes: lookups there
/// find nothing, exactly like positions past the end.
#[derive(Debug, Clone, Default)]
pub struct GoldMapping {
    slots: Vec<Option<PrecedentRecord>>,
}

impl GoldMapping {
    /// A dense mapping: the n-th record sits at position n.
    pub fn from_records(records: impl IntoIterator<Item = PrecedentRecord>) -> Self {
        Self {
            slots: records.into_iter().map(Some).collect(),
        }
    }

    pub fn get(&self, position: usize) -> Option<&PrecedentRecord> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// Number of addressable positions, holes included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of positions that hold a record.
    pub fn record_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Positions no row claims.
    pub fn holes(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn place(&mut self, position: usize, record: PrecedentRecord) -> Result<(), PrecedentRecord> {
        if position >= self.slots.len() {
            self.slots.resize(position + 1, None);
        }
        match &self.slots[position] {
            Some(_) => Err(record),
            None => {
                self.slots[position] = Some(record);
                Ok(())
            }
        }
    }
}

/// Parse gold mapping JSONL.
///
/// Blank lines are skipped. A row with `idx` is placed at that position; a
/// row without one takes its line order among the non-blank rows. Two rows
/// claiming the same position are rejected.
pub fn parse_mapping(content: &str) -> Result<GoldMapping, RetrievalError> {
    let mut mapping = GoldMapping::default();
    let mut row_no = 0;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: MappingRow = serde_json::from_str(line).map_err(|e| RetrievalError::IndexLoad {
            path: "gold mapping".into(),
            reason: format!("line {}: {e}", line_no + 1),
        })?;
        let position = row.idx.unwrap_or(row_no);
        row_no += 1;

        mapping
            .place(position, row.record)
            .map_err(|_| RetrievalError::IndexLoad {
                path: "gold mapping".into(),
                reason: format!("line {}: duplicate idx {position}", line_no + 1),
            })?;
    }

    let holes = mapping.holes();
    if !holes.is_empty() {
        warn!(?holes, "Gold mapping has positions without a precedent; hits there will be skipped");
    }
    Ok(mapping)
}

/// Load a gold mapping JSONL file.
pub fn load_mapping(path: &Path) -> Result<GoldMapping, RetrievalError> {
    let content = std::fs::read_to_string(path).map_err(|e| RetrievalError::IndexLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_mapping(&content)
}
