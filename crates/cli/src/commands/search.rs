//! `dictamen search`: Look up gold precedents for a query text.

use std::path::Path;

use dictamen_core::PrecedentRetriever;

pub async fn run(
    config_path: Option<&Path>,
    text: String,
    k: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    super::require_api_key(&config)?;

    let provider = super::default_provider(&config)?;
    let retriever = super::build_retriever(&config, provider)?;
    let k = k.unwrap_or(config.agent.initial_k);

    let hits = retriever.search_scored(&text, k).await?;
    if hits.is_empty() {
        println!("No precedents found.");
        return Ok(());
    }

    println!(
        "🔎 Top {} of {} precedents (k={k})\n",
        hits.len(),
        retriever.size()
    );
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>2}. {}  distance={:.4}",
            rank + 1,
            hit.record.doc_id,
            hit.distance
        );
        println!("    riesgos: {:?}", hit.record.risk_tags);
        if !hit.record.curator_note.is_empty() {
            println!("    nota: {}", hit.record.curator_note);
        }
    }

    Ok(())
}
