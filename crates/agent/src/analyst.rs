//! Analyst: produces the candidate risk report.
//!
//! Output is returned as raw text. Nothing here parses or validates it; that
//! is the Critic's job, and decoding happens only when the run finalizes.

use std::sync::Arc;

use async_trait::async_trait;
use dictamen_config::RoleConfig;
use dictamen_core::error::ProviderError;
use dictamen_core::provider::{Provider, ProviderRequest};
use dictamen_core::{CriticVerdict, PrecedentRecord};

use crate::prompts::{DOCUMENT_PLACEHOLDER, PRECEDENTS_PLACEHOLDER};

/// System instruction sent with every Analyst prompt.
pub const ANALYST_SYSTEM_PROMPT: &str = "Eres un asistente experto en derecho administrativo chileno y compras públicas. Devuelve SIEMPRE JSON válido.";

/// Rendered in place of the precedent list when retrieval found nothing.
pub const NO_PRECEDENTS_LINE: &str = "- (sin precedentes encontrados)";

/// Candidate-report generator.
#[async_trait]
pub trait Analyst: Send + Sync {
    async fn analyze(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Fill the Analyst template with the document text and the precedent list.
///
/// The document text is cut to `char_limit` characters.
pub fn build_analyst_prompt(
    template: &str,
    document_text: &str,
    precedents: &[PrecedentRecord],
    char_limit: usize,
) -> String {
    let list = if precedents.is_empty() {
        NO_PRECEDENTS_LINE.to_string()
    } else {
        precedents
            .iter()
            .map(PrecedentRecord::render_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    template
        .replace(PRECEDENTS_PLACEHOLDER, &list)
        .replace(DOCUMENT_PLACEHOLDER, truncate_chars(document_text, char_limit))
}

/// Append the Critic's feedback and the repair instruction to `original_prompt`.
pub fn build_repair_prompt(original_prompt: &str, verdict: &CriticVerdict) -> String {
    let feedback = serde_json::to_string_pretty(&verdict.errors).unwrap_or_else(|_| {
        verdict
            .errors
            .iter()
            .map(|e| format!("- {}: {} ({})", e.field, e.reason, e.suggestion))
            .collect::<Vec<_>>()
            .join("\n")
    });

    format!(
        "{original_prompt}\n\n\
         OBSERVACIONES DEL CRÍTICO SOBRE TU RESPUESTA ANTERIOR:\n{feedback}\n\n\
         Corrige SOLO las citas señaladas reemplazándolas por fragmentos literales de la resolución, \
         o elimina los riesgos que no tengan respaldo en el texto. Devuelve SOLO el JSON con el mismo esquema."
    )
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Analyst backed by a chat completion provider.
pub struct LlmAnalyst {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmAnalyst {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        let role = RoleConfig::analyst();
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
impl Analyst for LlmAnalyst {
    async fn analyze(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ProviderRequest::system_user(
            &self.model,
            ANALYST_SYSTEM_PROMPT,
            prompt,
            self.temperature,
            Some(self.max_tokens),
        );
        let response = self.provider.complete(request).await?;
        tracing::debug!(
            model = %response.model,
            chars = response.message.content.len(),
            "Analyst answered"
        );
        Ok(response.message.content)
    }
}
