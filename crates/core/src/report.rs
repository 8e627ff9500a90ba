//! Structured Analyst output, Critic verdicts, and the finalized Dictamen.
//!
//! Risk entries keep the Spanish keys used by the published reports
//! (`tipo`, `evidencia_resolucion`, `precedentes`, `recomendacion`); the
//! English names are accepted as aliases when decoding model output.

use serde::{Deserialize, Serialize};

use crate::decode::decode_json;

/// Sentinel error text stored when Analyst output cannot be decoded.
pub const UNDECODABLE_ERROR: &str = "No se pudo parsear JSON";

/// One risk finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    /// Catalog tag
    #[serde(rename = "tipo", alias = "type")]
    pub risk_type: String,

    /// Literal substring of the document text
    #[serde(rename = "evidencia_resolucion", alias = "evidence")]
    pub evidence: String,

    /// Identifiers of the precedents supporting this finding
    #[serde(
        rename = "precedentes",
        alias = "related_precedents",
        alias = "relatedPrecedents",
        default
    )]
    pub related_precedents: Vec<String>,

    #[serde(rename = "recomendacion", alias = "recommendation", default)]
    pub recommendation: String,
}

/// The schema the Analyst is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalystOutput {
    #[serde(rename = "riesgos", alias = "risks")]
    pub risks: Vec<RiskEntry>,
}

/// One defect reported by the Critic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticIssue {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub suggestion: String,
}

/// Pass/fail verdict with itemized defects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticVerdict {
    pub ok: bool,
    #[serde(default)]
    pub errors: Vec<CriticIssue>,
}

impl CriticVerdict {
    pub fn approved() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    /// Synthetic rejection used when the Critic's own answer is not decodable.
    pub fn unparseable(raw: &str) -> Self {
        let preview: String = raw.chars().take(200).collect();
        Self {
            ok: false,
            errors: vec![CriticIssue {
                field: "critic".into(),
                reason: format!("La salida del crítico no es JSON interpretable: {preview}"),
                suggestion: "Devuelve solo JSON válido con riesgos del catálogo y evidencia literal."
                    .into(),
            }],
        }
    }

    /// Decode a Critic answer, substituting a synthetic rejection on failure.
    pub fn decode(raw: &str) -> Self {
        decode_json(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Critic output not decodable, treating as rejection");
            Self::unparseable(raw)
        })
    }

    /// Fold extra issues into the verdict; any issue forces a rejection.
    pub fn merge_issues(&mut self, issues: Vec<CriticIssue>) {
        if !issues.is_empty() {
            self.ok = false;
            self.errors.extend(issues);
        }
    }
}

/// The finalized risk report of a run.
///
/// Serialized untagged: a decoded report is the Analyst schema itself; an
/// undecodable one is the `{error, raw_output}` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dictamen {
    Decoded(AnalystOutput),
    Undecodable { error: String, raw_output: String },
}

impl Dictamen {
    /// Decode raw Analyst text into a Dictamen. Never fails.
    pub fn from_raw(raw: &str) -> Self {
        match decode_json::<AnalystOutput>(raw) {
            Ok(output) => Self::Decoded(output),
            Err(e) => {
                tracing::debug!(error = %e, "Analyst output not decodable");
                Self::Undecodable {
                    error: UNDECODABLE_ERROR.into(),
                    raw_output: raw.to_string(),
                }
            }
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    pub fn risks(&self) -> &[RiskEntry] {
        match self {
            Self::Decoded(output) => &output.risks,
            Self::Undecodable { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalystOutput {
        AnalystOutput {
            risks: vec![RiskEntry {
                risk_type: "falta_ley_19886".into(),
                evidence: "no se cita la Ley 19.886".into(),
                related_precedents: vec!["G-07".into()],
                recommendation: "Citar la Ley 19.886 en los vistos.".into(),
            }],
        }
    }

    #[test]
    fn risk_entry_uses_report_keys() {
        let json = serde_json::to_value(&sample()).unwrap();
        let risk = &json["riesgos"][0];
        assert_eq!(risk["tipo"], "falta_ley_19886");
        assert_eq!(risk["evidencia_resolucion"], "no se cita la Ley 19.886");
        assert_eq!(risk["precedentes"][0], "G-07");
    }

    #[test]
    fn english_aliases_decode() {
        let raw = r#"{"risks":[{"type":"rut_invalido","evidence":"RUT 12.345.678","relatedPrecedents":[],"recommendation":"Corregir"}]}"#;
        let out: AnalystOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(out.risks[0].risk_type, "rut_invalido");
    }

    #[test]
    fn dictamen_roundtrip_preserves_structure() {
        let original = Dictamen::Decoded(sample());
        let json = serde_json::to_string(&original).unwrap();
        let back: Dictamen = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);

        let sentinel = Dictamen::from_raw("esto no es json");
        let json = serde_json::to_string(&sentinel).unwrap();
        let back: Dictamen = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sentinel);
    }

    #[test]
    fn undecodable_keeps_raw_text_verbatim() {
        let d = Dictamen::from_raw("  respuesta libre  ");
        match d {
            Dictamen::Undecodable { error, raw_output } => {
                assert_eq!(error, UNDECODABLE_ERROR);
                assert_eq!(raw_output, "  respuesta libre  ");
            }
            Dictamen::Decoded(_) => panic!("expected sentinel"),
        }
    }

    #[test]
    fn sentinel_json_has_error_and_raw_output() {
        let json = serde_json::to_value(Dictamen::from_raw("x")).unwrap();
        assert_eq!(json["error"], UNDECODABLE_ERROR);
        assert_eq!(json["raw_output"], "x");
    }

    #[test]
    fn verdict_decode_falls_back_to_rejection() {
        let v = CriticVerdict::decode("<html>oops</html>");
        assert!(!v.ok);
        assert_eq!(v.errors.len(), 1);
        assert_eq!(v.errors[0].field, "critic");
    }

    #[test]
    fn verdict_decode_reads_errors() {
        let v = CriticVerdict::decode(
            r#"{"ok":false,"errors":[{"field":"riesgos[0].evidencia_resolucion","reason":"parafraseo","suggestion":"citar literal"}]}"#,
        );
        assert!(!v.ok);
        assert_eq!(v.errors[0].reason, "parafraseo");
    }

    #[test]
    fn merge_issues_forces_rejection() {
        let mut v = CriticVerdict::approved();
        v.merge_issues(vec![]);
        assert!(v.ok);
        v.merge_issues(vec![CriticIssue {
            field: "f".into(),
            reason: "r".into(),
            suggestion: "s".into(),
        }]);
        assert!(!v.ok);
        assert_eq!(v.errors.len(), 1);
    }
}
