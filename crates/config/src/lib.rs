//! Configuration loading, validation, and management for Dictamen.
//!
//! Loads configuration from `~/.dictamen/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use dictamen_core::RiskCatalog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.dictamen/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model for all three generative roles
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Orchestration loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Analyst generation settings
    #[serde(default = "RoleConfig::analyst")]
    pub analyst: RoleConfig,

    /// Critic generation settings
    #[serde(default = "RoleConfig::critic")]
    pub critic: RoleConfig,

    /// Planner generation settings
    #[serde(default = "RoleConfig::planner")]
    pub planner: RoleConfig,

    /// Prompt template locations
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Precedent index locations and embedding convention
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Risk catalog override
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("agent", &self.agent)
            .field("analyst", &self.analyst)
            .field("critic", &self.critic)
            .field("planner", &self.planner)
            .field("templates", &self.templates)
            .field("retrieval", &self.retrieval)
            .field("catalog", &self.catalog)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Settings of the planner-driven control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum planner decisions per run
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Retrieval width at run start
    #[serde(default = "default_initial_k")]
    pub initial_k: usize,

    /// Lower bound applied when ADJUST_K computes its own width
    #[serde(default = "default_k_min")]
    pub k_min: usize,

    /// Upper bound applied when ADJUST_K computes its own width
    #[serde(default = "default_k_max")]
    pub k_max: usize,

    /// Step added to k when ADJUST_K carries no explicit width
    #[serde(default = "default_k_increment")]
    pub k_increment: usize,

    /// Characters of document text embedded in the Analyst prompt
    #[serde(default = "default_document_char_limit")]
    pub document_char_limit: usize,

    /// Fold the deterministic grounding check into the Critic verdict
    #[serde(default)]
    pub strict_grounding: bool,
}

fn default_max_steps() -> usize {
    4
}
fn default_initial_k() -> usize {
    5
}
fn default_k_min() -> usize {
    5
}
fn default_k_max() -> usize {
    10
}
fn default_k_increment() -> usize {
    3
}
fn default_document_char_limit() -> usize {
    8000
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            initial_k: default_initial_k(),
            k_min: default_k_min(),
            k_max: default_k_max(),
            k_increment: default_k_increment(),
            document_char_limit: default_document_char_limit(),
            strict_grounding: false,
        }
    }
}

/// Generation parameters for one generative role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Model override (falls back to `default_model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub temperature: f32,

    pub max_tokens: u32,
}

impl RoleConfig {
    pub fn analyst() -> Self {
        Self {
            model: None,
            temperature: 0.2,
            max_tokens: 1600,
        }
    }

    pub fn critic() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            max_tokens: 1200,
        }
    }

    pub fn planner() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            max_tokens: 400,
        }
    }

    /// The model this role should use.
    pub fn model_or<'a>(&'a self, default_model: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default_model)
    }
}

/// Locations of the three prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Analyst template with `<<RESOLUCION_TEXTO>>` and `<<LISTA_PRECEDENTES_CON_CITAS>>`
    #[serde(default = "default_analyst_template")]
    pub analyst: PathBuf,

    /// Planner system prompt
    #[serde(default = "default_planner_template")]
    pub planner: PathBuf,

    /// Critic system prompt; a built-in template is used when missing
    #[serde(default = "default_critic_template")]
    pub critic: PathBuf,
}

fn default_analyst_template() -> PathBuf {
    AppConfig::config_dir().join("prompts").join("analyst.txt")
}
fn default_planner_template() -> PathBuf {
    AppConfig::config_dir().join("prompts").join("planner.txt")
}
fn default_critic_template() -> PathBuf {
    AppConfig::config_dir().join("prompts").join("critic.txt")
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            analyst: default_analyst_template(),
            planner: default_planner_template(),
            critic: default_critic_template(),
        }
    }
}

/// Precedent index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Precomputed vector index (JSON)
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Gold mapping, one precedent per line (JSONL)
    #[serde(default = "default_mapping_path")]
    pub mapping_path: PathBuf,

    /// Embedding model used for queries; must match the index
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_index_path() -> PathBuf {
    AppConfig::config_dir().join("gold").join("gold.index.json")
}
fn default_mapping_path() -> PathBuf {
    AppConfig::config_dir().join("gold").join("gold_mapping.jsonl")
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            mapping_path: default_mapping_path(),
            embedding_model: default_embedding_model(),
        }
    }
}

/// Optional replacement of the built-in risk catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CatalogConfig {
    /// The active catalog: configured tags, or the built-in one.
    pub fn build(&self) -> RiskCatalog {
        if self.tags.is_empty() {
            RiskCatalog::default()
        } else {
            RiskCatalog::from_tags(self.tags.iter().cloned())
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from `path`, or the default path (~/.dictamen/config.toml).
    ///
    /// Also checks environment variables:
    /// - `DICTAMEN_API_KEY` (highest priority), `OPENAI_API_KEY`, `OPENROUTER_API_KEY`
    /// - `DICTAMEN_PROVIDER`, `DICTAMEN_MODEL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(path.unwrap_or(&default_path))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("DICTAMEN_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if let Some(provider) = lookup("DICTAMEN_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("DICTAMEN_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".dictamen")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let agent = &self.agent;
        if agent.max_steps == 0 {
            return Err(ConfigError::ValidationError("agent.max_steps must be >= 1".into()));
        }
        if agent.initial_k == 0 {
            return Err(ConfigError::ValidationError("agent.initial_k must be >= 1".into()));
        }
        if agent.k_min == 0 || agent.k_min > agent.k_max {
            return Err(ConfigError::ValidationError(
                "agent.k_min must be >= 1 and <= agent.k_max".into(),
            ));
        }
        if agent.document_char_limit == 0 {
            return Err(ConfigError::ValidationError(
                "agent.document_char_limit must be > 0".into(),
            ));
        }

        for (role, cfg) in [("analyst", &self.analyst), ("critic", &self.critic), ("planner", &self.planner)] {
            if !(0.0..=2.0).contains(&cfg.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "{role}.temperature must be between 0.0 and 2.0"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            agent: AgentSettings::default(),
            analyst: RoleConfig::analyst(),
            critic: RoleConfig::critic(),
            planner: RoleConfig::planner(),
            templates: TemplateConfig::default(),
            retrieval: RetrievalConfig::default(),
            catalog: CatalogConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for dictamen_core::Error {
    fn from(e: ConfigError) -> Self {
        dictamen_core::Error::config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.agent.max_steps, 4);
        assert_eq!(config.agent.initial_k, 5);
        assert_eq!((config.agent.k_min, config.agent.k_max), (5, 10));
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.agent.document_char_limit, 8000);
        assert_eq!(parsed.analyst.max_tokens, 1600);
    }

    #[test]
    fn zero_max_steps_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_k_bounds_rejected() {
        let mut config = AppConfig::default();
        config.agent.k_min = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_role_temperature_rejected() {
        let mut config = AppConfig::default();
        config.critic.temperature = 3.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("critic.temperature"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_model, "gpt-3.5-turbo");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "default_model = \"gpt-4o-mini\"\n[agent]\nmax_steps = 6\nstrict_grounding = true\n[catalog]\ntags = [\"falta_ley_19886\", \"rut_invalido\"]"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.agent.max_steps, 6);
        assert!(config.agent.strict_grounding);
        assert_eq!(config.agent.initial_k, 5);
        assert_eq!(config.catalog.build().len(), 2);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent\nmax_steps = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            "OPENAI_API_KEY" => Some("sk-openai".into()),
            "OPENROUTER_API_KEY" => Some("sk-or".into()),
            "DICTAMEN_MODEL" => Some("gpt-4o".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn configured_key_wins_over_env() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(|_| Some("from-env".into()));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn role_model_falls_back_to_default() {
        let config = AppConfig::default();
        assert_eq!(config.critic.model_or(&config.default_model), "gpt-3.5-turbo");
        let role = RoleConfig {
            model: Some("gpt-4o".into()),
            ..RoleConfig::critic()
        };
        assert_eq!(role.model_or("gpt-3.5-turbo"), "gpt-4o");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-3.5-turbo"));
        assert!(toml_str.contains("max_steps = 4"));
    }
}
