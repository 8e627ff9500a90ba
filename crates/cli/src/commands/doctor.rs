//! `dictamen doctor`: Diagnose configuration, templates and the gold index.

use dictamen_config::AppConfig;
use dictamen_retrieval::{FlatIndex, load_mapping};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Dictamen Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    // Check config
    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config first; remaining checks skipped.");
            return Ok(());
        }
    };

    // Check API key
    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured — set OPENAI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    // Check provider
    let router = dictamen_providers::router::build_from_config(&config);
    let mut names = router.list();
    names.sort_unstable();
    println!("  ✅ Providers: {}", names.join(", "));
    match router.default() {
        Some(provider) if config.has_api_key() => match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ❌ Provider '{}' rejected the health check", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        Some(_) => println!("  ⚠️  Provider health check skipped (no API key)"),
        None => {
            println!("  ❌ Default provider '{}' not available", config.default_provider);
            issues += 1;
        }
    }

    // Check templates
    for (role, path, required) in [
        ("Analyst", &config.templates.analyst, true),
        ("Planner", &config.templates.planner, true),
        ("Critic", &config.templates.critic, false),
    ] {
        if path.exists() {
            println!("  ✅ {role} template: {}", path.display());
        } else if required {
            println!("  ❌ {role} template missing: {} — run `dictamen onboard`", path.display());
            issues += 1;
        } else {
            println!("  ⚠️  {role} template missing, built-in template will be used");
        }
    }

    // Check gold index and mapping
    let index = match FlatIndex::load(&config.retrieval.index_path) {
        Ok(index) => {
            println!(
                "  ✅ Gold index: {} vectors, dimension {}, {:?}{}",
                index.len(),
                index.dimension,
                index.metric,
                if index.normalized { ", normalized" } else { "" }
            );
            Some(index)
        }
        Err(e) => {
            println!("  ❌ Gold index: {e}");
            issues += 1;
            None
        }
    };

    let mapping = match load_mapping(&config.retrieval.mapping_path) {
        Ok(mapping) => {
            println!("  ✅ Gold mapping: {} precedents", mapping.record_count());
            let holes = mapping.holes();
            if !holes.is_empty() {
                println!("  ⚠️  Gold mapping has no precedent at positions {holes:?}");
                issues += 1;
            }
            Some(mapping)
        }
        Err(e) => {
            println!("  ❌ Gold mapping: {e}");
            issues += 1;
            None
        }
    };

    if let (Some(index), Some(mapping)) = (&index, &mapping) {
        if index.len() != mapping.len() {
            println!(
                "  ⚠️  Index has {} vectors but mapping covers {} positions",
                index.len(),
                mapping.len()
            );
            issues += 1;
        }
        match &index.model {
            Some(model) if model != &config.retrieval.embedding_model => {
                println!(
                    "  ❌ Index built with '{model}' but queries use '{}'",
                    config.retrieval.embedding_model
                );
                issues += 1;
            }
            Some(_) => println!("  ✅ Embedding model matches index"),
            None => println!("  ⚠️  Index does not record its embedding model"),
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
