//! Subcommand implementations and the wiring they share.

pub mod analyze;
pub mod catalog;
pub mod doctor;
pub mod onboard;
pub mod search;

use std::path::Path;
use std::sync::Arc;

use dictamen_config::AppConfig;
use dictamen_core::provider::Provider;
use dictamen_core::{Error, RetrievalError};
use dictamen_retrieval::{FlatIndex, ProviderEmbedder, VectorRetriever, load_mapping};

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// Abort with setup instructions when no API key is available.
pub fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export OPENAI_API_KEY='sk-...'           (OpenAI, default)");
    eprintln!("    export OPENROUTER_API_KEY='sk-or-v1-...' (with default_provider = \"openrouter\")");
    eprintln!("    export DICTAMEN_API_KEY='sk-...'         (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err(Box::new(Error::config("no API key found")))
}

/// The default provider from config.
pub fn default_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    let router = dictamen_providers::router::build_from_config(config);
    router
        .default()
        .ok_or_else(|| Error::config(format!("provider '{}' not available", config.default_provider)).into())
}

/// Load the gold index and mapping and pair them with a query embedder.
///
/// An index built with another embedding model is a configuration error.
pub fn build_retriever(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
) -> Result<VectorRetriever, Error> {
    let index = FlatIndex::load(&config.retrieval.index_path)?;
    let mapping = load_mapping(&config.retrieval.mapping_path)?;
    let embedder = Arc::new(ProviderEmbedder::new(
        provider,
        &config.retrieval.embedding_model,
    ));

    VectorRetriever::new(index, mapping, embedder).map_err(|e| match e {
        RetrievalError::IncompatibleEmbedding(message) => Error::config(message),
        other => Error::Retrieval(other),
    })
}
