//! Prompt templates for the three generative roles.

use std::path::Path;

use dictamen_config::TemplateConfig;
use dictamen_core::{Error, Result, RiskCatalog};
use tracing::{debug, warn};

/// Replaced by the (possibly truncated) document text in the Analyst template.
pub const DOCUMENT_PLACEHOLDER: &str = "<<RESOLUCION_TEXTO>>";

/// Replaced by the rendered precedent list in the Analyst template.
pub const PRECEDENTS_PLACEHOLDER: &str = "<<LISTA_PRECEDENTES_CON_CITAS>>";

/// Replaced by the risk catalog in the Planner and Critic prompts.
pub const CATALOG_PLACEHOLDER: &str = "<<CATALOGO_RIESGOS>>";

pub const DEFAULT_ANALYST_TEMPLATE: &str = r#"Eres un abogado revisor de resoluciones de adjudicación de compras públicas en Chile.

Analiza la siguiente resolución y detecta riesgos de cumplimiento normativo.

RESOLUCIÓN:
<<RESOLUCION_TEXTO>>

PRECEDENTES SIMILARES (casos curados con riesgos conocidos):
<<LISTA_PRECEDENTES_CON_CITAS>>

Responde SOLO con JSON válido con este esquema:
{
  "riesgos": [
    {
      "tipo": "<etiqueta del catálogo>",
      "evidencia_resolucion": "<fragmento literal copiado de la resolución>",
      "precedentes": ["<doc_id de precedentes relacionados>"],
      "recomendacion": "<acción concreta para corregir el riesgo>"
    }
  ]
}
Si no hay riesgos, responde {"riesgos": []}.
"#;

pub const DEFAULT_PLANNER_TEMPLATE: &str = r#"Eres el planificador de un revisor de resoluciones de adjudicación.
Recibes un JSON con el documento, el catálogo de riesgos, el paso actual, las acciones previas y el estado del scratchpad (k y precedentes recuperados).

Catálogo de riesgos:
<<CATALOGO_RIESGOS>>

Acciones disponibles:
- SCAN_DOC: revisar el documento sin cambios de estado.
- RETRIEVE_GOLD {"k": n}: recuperar los n precedentes más similares.
- ADJUST_K {"k": n}: cambiar el número de precedentes sin recuperar (sin k, aumenta el actual).
- EVAL_RISKS: ejecutar el análisis de riesgos con los precedentes actuales y validarlo.
- FINALIZE: terminar.

Responde SOLO con JSON: {"thought": "<razonamiento breve>", "action": "<ACCIÓN>", "args": {}}
"#;

/// Used when no Critic template file is available.
pub const BUILTIN_CRITIC_TEMPLATE: &str = r#"Eres un crítico estricto de informes de riesgos sobre resoluciones de adjudicación.
Recibes la RESOLUCIÓN completa y un CANDIDATO producido por un analista. Verifica:
1. El CANDIDATO es JSON válido con la forma {"riesgos": [...]}.
2. Cada "tipo" pertenece al catálogo:
<<CATALOGO_RIESGOS>>
3. Cada "evidencia_resolucion" es una subcadena literal (exacta, respetando mayúsculas) de la RESOLUCIÓN. Una paráfrasis o una cita inventada es un error.

Responde SOLO con JSON: {"ok": true|false, "errors": [{"field": "...", "reason": "...", "suggestion": "..."}]}
"#;

/// The three prompt texts used by a run, with the catalog already substituted
/// into the Planner and Critic prompts.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub analyst: String,
    pub planner: String,
    pub critic: String,
}

impl PromptTemplates {
    /// Read the templates from disk.
    ///
    /// Missing Analyst or Planner templates are configuration errors. A
    /// missing Critic template is replaced by [`BUILTIN_CRITIC_TEMPLATE`].
    pub fn load(config: &TemplateConfig, catalog: &RiskCatalog) -> Result<Self> {
        let analyst = read_required("Analyst", &config.analyst)?;
        let planner = read_required("Planner", &config.planner)?;
        let critic = match std::fs::read_to_string(&config.critic) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    path = %config.critic.display(),
                    "Critic template unavailable ({e}), using built-in template"
                );
                BUILTIN_CRITIC_TEMPLATE.to_string()
            }
        };

        Ok(Self::from_parts(analyst, planner, critic, catalog))
    }

    /// The built-in defaults, as written by `onboard`.
    pub fn builtin(catalog: &RiskCatalog) -> Self {
        Self::from_parts(
            DEFAULT_ANALYST_TEMPLATE.to_string(),
            DEFAULT_PLANNER_TEMPLATE.to_string(),
            BUILTIN_CRITIC_TEMPLATE.to_string(),
            catalog,
        )
    }

    pub fn from_parts(analyst: String, planner: String, critic: String, catalog: &RiskCatalog) -> Self {
        Self {
            analyst,
            planner: with_catalog(&planner, catalog),
            critic: with_catalog(&critic, catalog),
        }
    }
}

/// Substitute the catalog description into `template`.
pub fn with_catalog(template: &str, catalog: &RiskCatalog) -> String {
    template.replace(CATALOG_PLACEHOLDER, &catalog.describe())
}

fn read_required(role: &str, path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("{role} template {}: {e}", path.display())))?;
    debug!(path = %path.display(), "Loaded {role} template");
    Ok(text)
}
