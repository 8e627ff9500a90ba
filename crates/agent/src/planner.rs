//! Planner: chooses the next control-loop action.
//!
//! The Planner answers with JSON text `{thought, action, args}`. Its answer is
//! never trusted as control flow directly: it is parsed into the closed
//! [`PlanAction`] variant, and anything unrecognized becomes
//! [`PlanAction::Unknown`], which the loop runs as EVAL_RISKS.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dictamen_config::RoleConfig;
use dictamen_core::decode::decode_json;
use dictamen_core::error::ProviderError;
use dictamen_core::provider::{Provider, ProviderRequest};
use serde::Deserialize;
use tracing::{debug, warn};

/// Next-action source for the orchestrator.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Return the raw planner answer for the given scratchpad snapshot.
    async fn plan(
        &self,
        system_prompt: &str,
        snapshot: &serde_json::Value,
    ) -> Result<String, ProviderError>;
}

/// The action vocabulary of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    ScanDoc,
    RetrieveGold { k: Option<usize> },
    AdjustK { k: Option<usize> },
    EvalRisks,
    Finalize,
    /// Unparseable answer or unrecognized action name
    Unknown(String),
}

impl PlanAction {
    /// The action actually dispatched: `Unknown` runs as `EvalRisks`.
    pub fn resolved(self) -> Self {
        match self {
            Self::Unknown(name) => {
                warn!(action = %name, "Unrecognized planner action, falling back to EVAL_RISKS");
                Self::EvalRisks
            }
            other => other,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ScanDoc => "SCAN_DOC",
            Self::RetrieveGold { .. } => "RETRIEVE_GOLD",
            Self::AdjustK { .. } => "ADJUST_K",
            Self::EvalRisks => "EVAL_RISKS",
            Self::Finalize => "FINALIZE",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetrieveGold { k: Some(k) } | Self::AdjustK { k: Some(k) } => {
                write!(f, "{} k={k}", self.name())
            }
            Self::Unknown(name) => write!(f, "UNKNOWN({name})"),
            _ => f.write_str(self.name()),
        }
    }
}

/// A parsed planner answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDecision {
    pub thought: String,
    pub action: PlanAction,
}

#[derive(Deserialize)]
struct RawDecision {
    #[serde(default)]
    thought: String,
    action: String,
    #[serde(default)]
    args: serde_json::Value,
}

impl PlanDecision {
    /// Parse a planner answer. Never fails.
    pub fn parse(raw: &str) -> Self {
        let decision: RawDecision = match decode_json(raw) {
            Ok(d) => d,
            Err(e) => {
                debug!(error = %e, "Planner output not decodable");
                let preview: String = raw.chars().take(80).collect();
                return Self {
                    thought: String::new(),
                    action: PlanAction::Unknown(preview),
                };
            }
        };

        let action = match decision.action.trim().to_ascii_uppercase().as_str() {
            "SCAN_DOC" => PlanAction::ScanDoc,
            "RETRIEVE_GOLD" => PlanAction::RetrieveGold {
                k: positive_k(&decision.args),
            },
            "ADJUST_K" => PlanAction::AdjustK {
                k: positive_k(&decision.args),
            },
            "EVAL_RISKS" => PlanAction::EvalRisks,
            "FINALIZE" => PlanAction::Finalize,
            _ => PlanAction::Unknown(decision.action),
        };

        Self {
            thought: decision.thought,
            action,
        }
    }
}

/// `args.k` as a positive width; zero, negative, or malformed counts as absent.
fn positive_k(args: &serde_json::Value) -> Option<usize> {
    let value = args.get("k")?;
    if value.is_null() {
        return None;
    }
    let k = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()));

    match k {
        Some(k) if k > 0 => Some(k as usize),
        _ => {
            warn!(k = %value, "Ignoring non-positive or malformed k");
            None
        }
    }
}

/// Planner backed by a chat completion provider.
pub struct LlmPlanner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmPlanner {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        let role = RoleConfig::planner();
        Self {
            provider,
            model: model.into(),
            temperature: role.temperature,
            max_tokens: role.max_tokens,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, role: &RoleConfig, default_model: &str) -> Self {
        Self {
            provider,
            model: role.model_or(default_model).to_string(),
            temperature: role.temperature,
            max_tokens: role.max_tokens,
        }
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(
        &self,
        system_prompt: &str,
        snapshot: &serde_json::Value,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest::system_user(
            &self.model,
            system_prompt,
            snapshot.to_string(),
            self.temperature,
            Some(self.max_tokens),
        );
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }
}
