//! Deterministic grounding check.
//!
//! Mirrors the contract the Critic is asked to enforce: every risk type is a
//! catalog member and every evidence string is a literal, case-sensitive
//! substring of the document text.

use crate::catalog::RiskCatalog;
use crate::report::{AnalystOutput, CriticIssue};

/// Check `output` against `document_text` and `catalog`.
///
/// Returns one issue per violation; an empty list means the output is grounded.
pub fn verify(document_text: &str, output: &AnalystOutput, catalog: &RiskCatalog) -> Vec<CriticIssue> {
    let mut issues = Vec::new();

    for (i, risk) in output.risks.iter().enumerate() {
        if !catalog.contains(&risk.risk_type) {
            issues.push(CriticIssue {
                field: format!("riesgos[{i}].tipo"),
                reason: format!("'{}' no pertenece al catálogo de riesgos", risk.risk_type),
                suggestion: format!("Usa uno de: {}", catalog.tags().join(", ")),
            });
        }

        if risk.evidence.trim().is_empty() {
            issues.push(CriticIssue {
                field: format!("riesgos[{i}].evidencia_resolucion"),
                reason: "Evidencia vacía".into(),
                suggestion: "Cita un fragmento literal de la resolución o elimina el riesgo.".into(),
            });
        } else if !document_text.contains(&risk.evidence) {
            issues.push(CriticIssue {
                field: format!("riesgos[{i}].evidencia_resolucion"),
                reason: "La evidencia no aparece literalmente en la resolución".into(),
                suggestion: "Reemplaza por una subcadena exacta del texto o elimina el riesgo.".into(),
            });
        }
    }

    issues
}
