//! Writing a run's Dictamen to disk.

use std::path::{Path, PathBuf};

use dictamen_agent::RunOutcome;
use dictamen_core::Dictamen;

/// Markdown report for one Dictamen.
pub fn render_markdown(base: &str, dictamen: &Dictamen) -> String {
    let mut out = format!("# Informe de Riesgos – {base}\n\n");

    match dictamen {
        Dictamen::Decoded(output) if !output.risks.is_empty() => {
            for risk in &output.risks {
                out.push_str(&format!("## {}\n", risk.risk_type));
                out.push_str(&format!("- Evidencia: {}\n", risk.evidence));
                out.push_str(&format!("- Precedentes: {:?}\n", risk.related_precedents));
                out.push_str(&format!("- Recomendación: {}\n\n", risk.recommendation));
            }
        }
        _ => out.push_str("No se detectaron riesgos o hubo error.\n"),
    }

    out
}

/// Paths of the files written for one run.
#[derive(Debug)]
pub struct WrittenReport {
    pub json: PathBuf,
    pub markdown: PathBuf,
    pub trace: PathBuf,
}

/// Write `<base>.json`, `<base>.md` and `<base>.trace.json` under `outdir`.
pub fn write_outputs(
    outdir: &Path,
    base: &str,
    outcome: &RunOutcome,
) -> Result<WrittenReport, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(outdir)?;

    let written = WrittenReport {
        json: outdir.join(format!("{base}.json")),
        markdown: outdir.join(format!("{base}.md")),
        trace: outdir.join(format!("{base}.trace.json")),
    };

    std::fs::write(&written.json, serde_json::to_string_pretty(&outcome.dictamen)?)?;
    std::fs::write(&written.markdown, render_markdown(base, &outcome.dictamen))?;
    std::fs::write(&written.trace, serde_json::to_string_pretty(outcome)?)?;

    Ok(written)
}
