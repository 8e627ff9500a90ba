//! Scratchpad: mutable state of a single run.
//!
//! Holds the precedents retrieved so far and the current retrieval width.
//! Created empty at run start, mutated only by RETRIEVE_GOLD and ADJUST_K,
//! dropped when the run ends.

use dictamen_config::AgentSettings;
use dictamen_core::{PrecedentRecord, RiskCatalog};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scratchpad {
    pub document_id: String,
    pub precedents: Vec<PrecedentRecord>,
    pub k: usize,
}

impl Scratchpad {
    pub fn new(document_id: impl Into<String>, k: usize) -> Self {
        Self {
            document_id: document_id.into(),
            precedents: Vec::new(),
            k,
        }
    }

    /// Replace the precedents with a fresh retrieval made at width `k`.
    pub fn set_precedents(&mut self, precedents: Vec<PrecedentRecord>, k: usize) {
        self.precedents = precedents;
        self.k = k;
    }

    /// Change the retrieval width without retrieving.
    ///
    /// An explicit width is taken as given. Without one, the width grows by
    /// `k_increment` and is clamped into `[k_min, k_max]`.
    pub fn adjust_k(&mut self, explicit: Option<usize>, settings: &AgentSettings) -> usize {
        self.k = match explicit {
            Some(k) => k,
            None => (self.k + settings.k_increment)
                .max(settings.k_min)
                .min(settings.k_max),
        };
        self.k
    }

    /// The JSON view handed to the Planner.
    pub fn snapshot(
        &self,
        catalog: &RiskCatalog,
        step: usize,
        max_steps: usize,
        history: &[String],
    ) -> serde_json::Value {
        let precedents: Vec<serde_json::Value> = self
            .precedents
            .iter()
            .map(|p| json!({ "doc_id": p.doc_id, "riesgos": p.risk_tags }))
            .collect();

        json!({
            "document_id": self.document_id,
            "catalog": catalog.tags(),
            "step": step,
            "max_steps": max_steps,
            "history": history,
            "scratchpad": {
                "k": self.k,
                "precedent_count": self.precedents.len(),
                "precedents": precedents,
            },
        })
    }
}
