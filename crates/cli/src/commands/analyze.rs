//! `dictamen analyze`: Review one award document end to end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dictamen_agent::{LlmAnalyst, LlmCritic, LlmPlanner, Orchestrator, PromptTemplates};
use tracing::info;

use crate::documents::{self, Selector};
use crate::report;

pub struct AnalyzeArgs {
    pub jsonl: PathBuf,
    pub pattern: Option<String>,
    pub doc_id: Option<String>,
    pub index_pos: Option<usize>,
    pub outdir: PathBuf,
    pub max_steps: Option<usize>,
    pub k: Option<usize>,
}

pub async fn run(
    config_path: Option<&Path>,
    args: AnalyzeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    super::require_api_key(&config)?;

    let catalog = config.catalog.build();
    let templates = PromptTemplates::load(&config.templates, &catalog)?;

    let selector = Selector {
        doc_id: args.doc_id,
        pattern: args.pattern,
        index_pos: args.index_pos,
    };
    let record = documents::select(documents::load_records(&args.jsonl)?, &selector)?;
    let document = record.to_document();
    info!(doc_id = %document.doc_id, chars = document.text.chars().count(), "Selected document");

    let provider = super::default_provider(&config)?;
    let retriever = super::build_retriever(&config, provider.clone())?;

    let planner = LlmPlanner::from_config(provider.clone(), &config.planner, &config.default_model);
    let analyst = LlmAnalyst::from_config(provider.clone(), &config.analyst, &config.default_model);
    let critic = LlmCritic::from_config(
        provider,
        &config.critic,
        &config.default_model,
        templates.critic.clone(),
    );

    let mut orchestrator = Orchestrator::new(
        Arc::new(planner),
        Arc::new(analyst),
        Arc::new(critic),
        Arc::new(retriever),
        templates,
    )
    .with_settings(config.agent.clone())
    .with_catalog(catalog);
    if let Some(max_steps) = args.max_steps {
        orchestrator = orchestrator.with_max_steps(max_steps.max(1));
    }
    if let Some(k) = args.k {
        orchestrator = orchestrator.with_initial_k(k.max(1));
    }

    let outcome = orchestrator.run(&document).await?;
    let written = report::write_outputs(&args.outdir, &record.base_name(), &outcome)?;

    println!(
        "[OK] {} riesgo(s), {:?} en {} paso(s)",
        outcome.dictamen.risks().len(),
        outcome.finalization,
        outcome.steps_used
    );
    println!("Guardado:");
    println!("- {}", written.json.display());
    println!("- {}", written.markdown.display());
    println!("- {}", written.trace.display());

    Ok(())
}
