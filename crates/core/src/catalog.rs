//! The closed risk-type vocabulary.
//!
//! Every finalized risk entry must carry one of these tags. The built-in
//! catalog covers the three families the gold set is annotated with:
//! missing legal clauses, identifier formats, and value validation.

use serde::{Deserialize, Serialize};

/// Built-in tags with a short Spanish description used in prompts.
const BUILTIN: &[(&str, &str)] = &[
    ("falta_ley_19886", "No se cita la Ley 19.886 de Compras Públicas"),
    ("falta_reglamento_compras", "No se cita el Reglamento de la Ley 19.886 (Decreto 250)"),
    ("falta_considerandos", "Falta la sección de Considerandos"),
    ("clausula_legal_ausente", "Falta otra cláusula legal obligatoria"),
    ("rut_invalido", "RUT con formato inválido o sin dígito verificador"),
    ("id_licitacion_invalido", "ID de licitación con formato inválido"),
    ("monto_inconsistente", "Monto adjudicado inconsistente o ausente"),
    ("fecha_inconsistente", "Fechas inconsistentes o ausentes"),
    ("firma_ausente", "Falta firma o acto administrativo que autoriza"),
];

/// A fixed, finite set of allowed risk-type tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCatalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CatalogEntry {
    tag: String,
    #[serde(default)]
    description: String,
}

impl RiskCatalog {
    /// Build a catalog from bare tags (no descriptions). Duplicates are dropped.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<CatalogEntry> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if entries.iter().any(|e| e.tag == tag) {
                continue;
            }
            let description = BUILTIN
                .iter()
                .find(|(t, _)| *t == tag)
                .map(|(_, d)| d.to_string())
                .unwrap_or_default();
            entries.push(CatalogEntry { tag, description });
        }
        Self { entries }
    }

    /// Whether `tag` is a catalog member (exact match).
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|e| e.tag == tag)
    }

    pub fn tags(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.tag.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bullet list of `tag: description`, for embedding in prompts.
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                if e.description.is_empty() {
                    format!("- {}", e.tag)
                } else {
                    format!("- {}: {}", e.tag, e.description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for RiskCatalog {
    fn default() -> Self {
        Self::from_tags(BUILTIN.iter().map(|(t, _)| *t))
    }
}
