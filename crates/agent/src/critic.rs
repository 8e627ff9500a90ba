//! Critic: validates a candidate report against the document.
//!
//! The Critic is asked to check three things: the candidate is valid JSON,
//! every risk type is in the catalog, and every evidence string is a literal
//! substring of the document. Its answer is returned raw; the orchestrator
//! decodes it with [`dictamen_core::CriticVerdict::decode`].

use std::sync::Arc;

use async_trait::async_trait;
use dictamen_config::RoleConfig;
use dictamen_core::error::ProviderError;
use dictamen_core::provider::{Provider, ProviderRequest};

/// Candidate-report validator.
#[async_trait]
pub trait Critic: Send + Sync {
    async fn critique(&self, document_text: &str, candidate: &str) -> Result<String, ProviderError>;
}

/// The user message pairing the full document with the candidate.
pub fn critic_payload(document_text: &str, candidate: &str) -> String {
    format!("RESOLUCIÓN:\n{document_text}\n\nCANDIDATO:\n{candidate}")
}

/// Critic backed by a chat completion provider.
pub struct LlmCritic {
    provider: Arc<dyn Provider>,
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmCritic {
    /// `system_prompt` is the Critic template with the catalog already filled in.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        let role = RoleConfig::critic();
        Self {
            provider,
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature: role.temperature,
            max_tokens: role.max_tokens,
        }
    }

    pub fn from_config(
        provider: Arc<dyn Provider>,
        role: &RoleConfig,
        default_model: &str,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: role.model_or(default_model).to_string(),
            system_prompt: system_prompt.into(),
            temperature: role.temperature,
            max_tokens: role.max_tokens,
        }
    }
}

#[async_trait]
impl Critic for LlmCritic {
    async fn critique(&self, document_text: &str, candidate: &str) -> Result<String, ProviderError> {
        let request = ProviderRequest::system_user(
            &self.model,
            &self.system_prompt,
            critic_payload(document_text, candidate),
            self.temperature,
            Some(self.max_tokens),
        );
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }
}
