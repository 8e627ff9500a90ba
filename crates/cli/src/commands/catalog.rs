//! `dictamen catalog`: Print the active risk catalog.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let catalog = config.catalog.build();

    let source = if config.catalog.tags.is_empty() { "built-in" } else { "config" };
    println!("📋 Risk catalog ({} tags, {source})\n", catalog.len());
    println!("{}", catalog.describe());

    Ok(())
}
