//! `dictamen onboard`: First-time setup.

use dictamen_agent::prompts::{
    BUILTIN_CRITIC_TEMPLATE, DEFAULT_ANALYST_TEMPLATE, DEFAULT_PLANNER_TEMPLATE,
};
use dictamen_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_dir.join("config.toml"));

    println!("⚖️  Dictamen — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    // Create config file
    let config = if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        AppConfig::load_from(&config_path)?
    } else {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        AppConfig::default()
    };

    // Default prompt templates
    for (path, text) in [
        (&config.templates.analyst, DEFAULT_ANALYST_TEMPLATE),
        (&config.templates.planner, DEFAULT_PLANNER_TEMPLATE),
        (&config.templates.critic, BUILTIN_CRITIC_TEMPLATE),
    ] {
        if path.exists() {
            println!("  Template exists: {}", path.display());
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        println!("✅ Created template: {}", path.display());
    }

    if let Some(gold_dir) = config.retrieval.index_path.parent() {
        if !gold_dir.exists() {
            std::fs::create_dir_all(gold_dir)?;
            println!("✅ Created gold directory: {}", gold_dir.display());
        }
    }

    println!("\n📝 Next steps:");
    println!("   1. Set OPENAI_API_KEY or add api_key to {}", config_path.display());
    println!(
        "   2. Place the gold index and mapping at {} and {}",
        config.retrieval.index_path.display(),
        config.retrieval.mapping_path.display()
    );
    println!("   3. Run: dictamen doctor");
    println!("   4. Run: dictamen analyze --jsonl actas_limpias.jsonl --match <archivo>\n");

    Ok(())
}
