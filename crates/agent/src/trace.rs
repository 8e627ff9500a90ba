//! Run trace: ordered record of every planner decision, action, and
//! generative call made during a run.
//!
//! The trace is returned with the run outcome and can be exported to JSON
//! for inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the run trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Planner step the entry belongs to (1-based)
    pub step: usize,
    pub kind: TraceKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The kind of trace entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    /// Planner thought
    Plan,
    /// Action chosen for the step
    Action,
    /// Effect of the action on the scratchpad
    Observation,
    /// Raw Analyst output
    Analyst,
    /// Critic verdict
    Critic,
    /// Repair prompt issued after a rejection
    Repair,
    /// Post-loop forced evaluation
    Fallback,
    /// Deterministic grounding check result
    Grounding,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTrace {
    entries: Vec<TraceEntry>,
}

impl RunTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: usize, kind: TraceKind, content: impl Into<String>) {
        self.entries.push(TraceEntry {
            step,
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Entries of one kind, in order.
    pub fn of_kind(&self, kind: TraceKind) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human-readable rendering, one line per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("[{}] {:?}: {}", e.step, e.kind, e.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
