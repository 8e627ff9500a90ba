//! Orchestrator: the planner-driven control loop.
//!
//! Each step asks the Planner for an action and dispatches it:
//!
//! - `SCAN_DOC`: no-op.
//! - `RETRIEVE_GOLD{k}`: query the retriever with the document text and
//!   replace the scratchpad precedents.
//! - `ADJUST_K{k}`: change the retrieval width without retrieving.
//! - `EVAL_RISKS`: Analyst, then Critic; on rejection one repair round.
//!   Always terminal.
//! - `FINALIZE`: stop with no output.
//!
//! When the loop ends without output (FINALIZE or the step budget running
//! out), one forced Analyst call produces the result without a Critic pass.
//!
//! Malformed model answers never abort a run. Transport failures of the
//! generative or retrieval capabilities do.

use std::sync::Arc;

use dictamen_config::AgentSettings;
use dictamen_core::decode::decode_json;
use dictamen_core::grounding;
use dictamen_core::{
    AnalystOutput, CriticIssue, CriticVerdict, Dictamen, DocumentRecord, Error, PrecedentRecord,
    PrecedentRetriever, Result, RiskCatalog,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analyst::{Analyst, build_analyst_prompt, build_repair_prompt};
use crate::critic::Critic;
use crate::planner::{PlanAction, PlanDecision, Planner};
use crate::prompts::PromptTemplates;
use crate::scratchpad::Scratchpad;
use crate::trace::{RunTrace, TraceKind};

/// How the final output of a run was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finalization {
    /// First candidate approved by the Critic
    CriticApproved,
    /// Repaired candidate approved by the Critic
    Repaired,
    /// Repair rejected; the pre-repair candidate is kept
    KeptOriginal,
    /// Forced Analyst call after the loop, never criticized
    Fallback,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub document_id: String,
    pub dictamen: Dictamen,
    pub finalization: Finalization,
    /// Planner decisions taken
    pub steps_used: usize,
    pub analyst_calls: usize,
    pub critic_calls: usize,
    /// Scratchpad precedents when the run ended
    pub precedents: Vec<PrecedentRecord>,
    pub trace: RunTrace,
}

/// Per-run mutable state.
struct RunState {
    scratchpad: Scratchpad,
    trace: RunTrace,
    history: Vec<String>,
    step: usize,
    analyst_calls: usize,
    critic_calls: usize,
}

pub struct Orchestrator {
    planner: Arc<dyn Planner>,
    analyst: Arc<dyn Analyst>,
    critic: Arc<dyn Critic>,
    retriever: Arc<dyn PrecedentRetriever>,
    templates: PromptTemplates,
    catalog: RiskCatalog,
    settings: AgentSettings,
}

impl Orchestrator {
    /// Create an orchestrator with the default catalog and settings.
    pub fn new(
        planner: Arc<dyn Planner>,
        analyst: Arc<dyn Analyst>,
        critic: Arc<dyn Critic>,
        retriever: Arc<dyn PrecedentRetriever>,
        templates: PromptTemplates,
    ) -> Self {
        Self {
            planner,
            analyst,
            critic,
            retriever,
            templates,
            catalog: RiskCatalog::default(),
            settings: AgentSettings::default(),
        }
    }

    /// Set the loop settings (step budget, k policy, grounding mode).
    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the risk catalog.
    pub fn with_catalog(mut self, catalog: RiskCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set max planner steps.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.settings.max_steps = max;
        self
    }

    /// Set the initial retrieval width.
    pub fn with_initial_k(mut self, k: usize) -> Self {
        self.settings.initial_k = k;
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Review one document.
    pub async fn run(&self, document: &DocumentRecord) -> Result<RunOutcome> {
        if document.text.trim().is_empty() {
            return Err(Error::data(format!(
                "document '{}' has empty text",
                document.doc_id
            )));
        }

        info!(doc_id = %document.doc_id, max_steps = self.settings.max_steps, "Starting review run");

        let mut state = RunState {
            scratchpad: Scratchpad::new(&document.doc_id, self.settings.initial_k),
            trace: RunTrace::new(),
            history: Vec::new(),
            step: 0,
            analyst_calls: 0,
            critic_calls: 0,
        };
        let mut finalized: Option<(String, Finalization)> = None;

        while state.step < self.settings.max_steps {
            state.step += 1;
            let step = state.step;

            let snapshot = state.scratchpad.snapshot(
                &self.catalog,
                step,
                self.settings.max_steps,
                &state.history,
            );
            let raw = self.planner.plan(&self.templates.planner, &snapshot).await?;
            let decision = PlanDecision::parse(&raw);
            state.trace.record(step, TraceKind::Plan, decision.thought.as_str());

            let action = decision.action.clone().resolved();
            debug!(step, planned = %decision.action, action = %action, "Planner decision");
            state.trace.record(step, TraceKind::Action, action.to_string());
            state.history.push(action.to_string());

            match action {
                PlanAction::ScanDoc => {
                    state.trace.record(step, TraceKind::Observation, "sin cambios");
                }
                PlanAction::RetrieveGold { k } => {
                    let k = k.unwrap_or(state.scratchpad.k);
                    let precedents = self.retriever.search(&document.text, k).await?;
                    let available = self.retriever.size();
                    debug!(step, k, count = precedents.len(), available, "Retrieved precedents");
                    let ids: Vec<&str> = precedents.iter().map(|p| p.doc_id.as_str()).collect();
                    state.trace.record(
                        step,
                        TraceKind::Observation,
                        format!("k={k} de {available} precedentes={ids:?}"),
                    );
                    state.scratchpad.set_precedents(precedents, k);
                }
                PlanAction::AdjustK { k } => {
                    let k = state.scratchpad.adjust_k(k, &self.settings);
                    debug!(step, k, "Adjusted retrieval width");
                    state.trace.record(step, TraceKind::Observation, format!("k={k}"));
                }
                PlanAction::EvalRisks | PlanAction::Unknown(_) => {
                    finalized = Some(self.evaluate(document, &mut state).await?);
                    break;
                }
                PlanAction::Finalize => break,
            }
        }

        let (raw, finalization) = match finalized {
            Some(done) => done,
            None => {
                info!(
                    doc_id = %document.doc_id,
                    steps = state.step,
                    precedents = state.scratchpad.precedents.len(),
                    "Loop ended without output, forcing evaluation"
                );
                let prompt = self.analyst_prompt(document, &state.scratchpad);
                state.trace.record(
                    state.step,
                    TraceKind::Fallback,
                    format!(
                        "evaluación forzada con {} precedentes",
                        state.scratchpad.precedents.len()
                    ),
                );
                let raw = self.call_analyst(&prompt, &mut state).await?;
                (raw, Finalization::Fallback)
            }
        };

        let dictamen = Dictamen::from_raw(&raw);
        self.record_grounding(document, &dictamen, finalization, &mut state);

        info!(
            doc_id = %document.doc_id,
            finalization = ?finalization,
            risks = dictamen.risks().len(),
            decoded = dictamen.is_decoded(),
            steps = state.step,
            analyst_calls = state.analyst_calls,
            critic_calls = state.critic_calls,
            "Review run complete"
        );

        Ok(RunOutcome {
            document_id: document.doc_id.clone(),
            dictamen,
            finalization,
            steps_used: state.step,
            analyst_calls: state.analyst_calls,
            critic_calls: state.critic_calls,
            precedents: state.scratchpad.precedents,
            trace: state.trace,
        })
    }

    /// EVAL_RISKS: candidate, verdict, and at most one repair.
    async fn evaluate(
        &self,
        document: &DocumentRecord,
        state: &mut RunState,
    ) -> Result<(String, Finalization)> {
        let prompt = self.analyst_prompt(document, &state.scratchpad);
        let candidate = self.call_analyst(&prompt, state).await?;
        let verdict = self.review(document, &candidate, state).await?;
        if verdict.ok {
            return Ok((candidate, Finalization::CriticApproved));
        }

        info!(
            step = state.step,
            errors = verdict.errors.len(),
            "Candidate rejected, attempting one repair"
        );
        let repair_prompt = build_repair_prompt(&prompt, &verdict);
        state.trace.record(
            state.step,
            TraceKind::Repair,
            format!("reparación con {} observaciones", verdict.errors.len()),
        );
        let repaired = self.call_analyst(&repair_prompt, state).await?;
        let second = self.review(document, &repaired, state).await?;

        if second.ok {
            Ok((repaired, Finalization::Repaired))
        } else {
            warn!(
                step = state.step,
                errors = second.errors.len(),
                "Repair rejected, keeping the original candidate"
            );
            Ok((candidate, Finalization::KeptOriginal))
        }
    }

    fn analyst_prompt(&self, document: &DocumentRecord, scratchpad: &Scratchpad) -> String {
        build_analyst_prompt(
            &self.templates.analyst,
            &document.text,
            &scratchpad.precedents,
            self.settings.document_char_limit,
        )
    }

    async fn call_analyst(&self, prompt: &str, state: &mut RunState) -> Result<String> {
        let raw = self.analyst.analyze(prompt).await?;
        state.analyst_calls += 1;
        state.trace.record(state.step, TraceKind::Analyst, raw.as_str());
        Ok(raw)
    }

    /// Ask the Critic, decode its verdict, and in strict mode fold in the
    /// deterministic grounding issues.
    async fn review(
        &self,
        document: &DocumentRecord,
        candidate: &str,
        state: &mut RunState,
    ) -> Result<CriticVerdict> {
        let raw = self.critic.critique(&document.text, candidate).await?;
        state.critic_calls += 1;
        let mut verdict = CriticVerdict::decode(&raw);

        if self.settings.strict_grounding {
            let issues = match decode_json::<AnalystOutput>(candidate) {
                Ok(output) => grounding::verify(&document.text, &output, &self.catalog),
                Err(_) => vec![CriticIssue {
                    field: "riesgos".into(),
                    reason: "La respuesta no es JSON válido".into(),
                    suggestion: "Devuelve solo el JSON con el esquema indicado.".into(),
                }],
            };
            if !issues.is_empty() {
                debug!(count = issues.len(), "Grounding issues merged into verdict");
            }
            verdict.merge_issues(issues);
        }

        let summary = if verdict.ok {
            "ok".to_string()
        } else {
            let fields: Vec<&str> = verdict.errors.iter().map(|e| e.field.as_str()).collect();
            format!("rechazado: {fields:?}")
        };
        state.trace.record(state.step, TraceKind::Critic, summary);
        Ok(verdict)
    }

    fn record_grounding(
        &self,
        document: &DocumentRecord,
        dictamen: &Dictamen,
        finalization: Finalization,
        state: &mut RunState,
    ) {
        let Dictamen::Decoded(output) = dictamen else {
            state.trace.record(state.step, TraceKind::Grounding, "salida no decodificable");
            return;
        };

        let issues = grounding::verify(&document.text, output, &self.catalog);
        if issues.is_empty() {
            state.trace.record(state.step, TraceKind::Grounding, "ok");
            return;
        }

        if matches!(finalization, Finalization::CriticApproved | Finalization::Repaired) {
            warn!(
                doc_id = %document.doc_id,
                count = issues.len(),
                "Critic approved an output that fails the grounding check"
            );
        }
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        state.trace.record(
            state.step,
            TraceKind::Grounding,
            format!("{} problemas: {fields:?}", issues.len()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        ScriptedAnalyst, ScriptedCritic, ScriptedPlanner, StaticRetriever, gold_set,
    };
    use dictamen_core::report::UNDECODABLE_ERROR;
    use serde_json::json;

    const DOC: &str = "RESOLUCIÓN EXENTA N° 123. VISTOS: el acta de evaluación. \
                       En los vistos no se cita la Ley 19.886 de Compras Públicas. \
                       Adjudíquese a Proveedor Ltda., RUT 76.543.210-K.";

    const GROUNDED: &str = r#"{"riesgos":[{"tipo":"falta_ley_19886","evidencia_resolucion":"no se cita la Ley 19.886","precedentes":["G0"],"recomendacion":"Citar la Ley 19.886 en los vistos."}]}"#;

    const PARAPHRASED: &str = r#"{"riesgos":[{"tipo":"falta_ley_19886","evidencia_resolucion":"la ley de compras no aparece","precedentes":[],"recomendacion":"Citar la ley."}]}"#;

    const ANALYST_TEMPLATE: &str = "Resolución:\n<<RESOLUCION_TEXTO>>\nPrecedentes:\n<<LISTA_PRECEDENTES_CON_CITAS>>";

    struct Fixture {
        planner: Arc<ScriptedPlanner>,
        analyst: Arc<ScriptedAnalyst>,
        critic: Arc<ScriptedCritic>,
        retriever: Arc<StaticRetriever>,
    }

    impl Fixture {
        fn new(planner: ScriptedPlanner, analyst: ScriptedAnalyst, critic: ScriptedCritic) -> Self {
            Self {
                planner: Arc::new(planner),
                analyst: Arc::new(analyst),
                critic: Arc::new(critic),
                retriever: Arc::new(StaticRetriever::new(gold_set())),
            }
        }

        fn orchestrator(&self) -> Orchestrator {
            let templates = PromptTemplates::from_parts(
                ANALYST_TEMPLATE.into(),
                "planificador".into(),
                "crítico".into(),
                &RiskCatalog::default(),
            );
            Orchestrator::new(
                self.planner.clone(),
                self.analyst.clone(),
                self.critic.clone(),
                self.retriever.clone(),
                templates,
            )
        }
    }

    fn doc() -> DocumentRecord {
        DocumentRecord::new("RES-123", DOC)
    }

    fn assert_grounded(outcome: &RunOutcome) {
        for risk in outcome.dictamen.risks() {
            assert!(
                DOC.contains(&risk.evidence),
                "evidence not in document: {}",
                risk.evidence
            );
        }
    }

    #[tokio::test]
    async fn retrieve_then_eval_approved_on_first_attempt() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[
                ("RETRIEVE_GOLD", json!({"k": 5})),
                ("EVAL_RISKS", json!({})),
            ]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::CriticApproved);
        assert_eq!(outcome.steps_used, 2);
        assert_eq!(outcome.analyst_calls, 1);
        assert_eq!(outcome.critic_calls, 1);
        assert_eq!(outcome.precedents.len(), 5);

        let risks = outcome.dictamen.risks();
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].risk_type, "falta_ley_19886");
        assert_grounded(&outcome);

        // Retrieval queried with the document's own text.
        assert_eq!(f.retriever.queries(), vec![(DOC.to_string(), 5)]);
        // Analyst saw the retrieved precedents.
        assert!(f.analyst.prompts()[0].contains("(doc_id=G4)"));
        assert!(!f.analyst.prompts()[0].contains("(doc_id=G5)"));
    }

    #[tokio::test]
    async fn retrieve_without_k_uses_initial_width() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("RETRIEVE_GOLD", json!({})), ("EVAL_RISKS", json!({}))]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().with_initial_k(7).run(&doc()).await.unwrap();

        assert_eq!(f.retriever.queries(), vec![(DOC.to_string(), 7)]);
        assert_eq!(outcome.precedents.len(), 7);
        let observation = outcome.trace.of_kind(TraceKind::Observation).next().unwrap();
        assert!(observation.content.starts_with("k=7 de 10 "));
    }

    #[tokio::test]
    async fn finalize_first_forces_fallback_with_zero_precedents() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("FINALIZE", json!({}))]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::Fallback);
        assert_eq!(outcome.steps_used, 1);
        assert_eq!(outcome.analyst_calls, 1);
        assert_eq!(outcome.critic_calls, 0);
        assert!(outcome.precedents.is_empty());
        assert!(!outcome.dictamen.risks().is_empty());
        assert!(f.analyst.prompts()[0].contains("(sin precedentes encontrados)"));
        assert_eq!(outcome.trace.of_kind(TraceKind::Fallback).count(), 1);
    }

    #[tokio::test]
    async fn always_rejecting_critic_keeps_original_after_one_repair() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("EVAL_RISKS", json!({}))]),
            ScriptedAnalyst::new(&[GROUNDED, PARAPHRASED]),
            ScriptedCritic::rejecting(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::KeptOriginal);
        assert_eq!(f.analyst.calls(), 2);
        assert_eq!(f.critic.calls(), 2);
        assert_eq!(outcome.analyst_calls, 2);
        assert_eq!(outcome.critic_calls, 2);
        assert_eq!(outcome.dictamen, Dictamen::from_raw(GROUNDED));

        // The repair prompt carries the Critic's feedback.
        let prompts = f.analyst.prompts();
        assert!(prompts[1].starts_with(&prompts[0]));
        assert!(prompts[1].contains("no es literal"));
        assert_eq!(f.critic.candidates(), vec![GROUNDED.to_string(), PARAPHRASED.to_string()]);
        assert_eq!(outcome.trace.of_kind(TraceKind::Repair).count(), 1);
    }

    #[tokio::test]
    async fn approved_repair_replaces_candidate() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("EVAL_RISKS", json!({}))]),
            ScriptedAnalyst::new(&[PARAPHRASED, GROUNDED]),
            ScriptedCritic::new(&[
                r#"{"ok": false, "errors": [{"field": "riesgos[0].evidencia_resolucion", "reason": "parafraseo", "suggestion": "citar"}]}"#,
                r#"{"ok": true, "errors": []}"#,
            ]),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::Repaired);
        assert_eq!(outcome.dictamen, Dictamen::from_raw(GROUNDED));
        assert_grounded(&outcome);
    }

    #[tokio::test]
    async fn undecodable_critic_triggers_repair() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("EVAL_RISKS", json!({}))]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::new(&["Todo parece correcto.", r#"{"ok": true}"#]),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::Repaired);
        assert_eq!(outcome.analyst_calls, 2);
        assert_eq!(outcome.critic_calls, 2);
    }

    #[tokio::test]
    async fn unknown_action_runs_eval_risks() {
        let f = Fixture::new(
            ScriptedPlanner::new(&["voy a evaluar los riesgos"]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::CriticApproved);
        assert_eq!(outcome.steps_used, 1);
        let action = outcome.trace.of_kind(TraceKind::Action).next().unwrap();
        assert_eq!(action.content, "EVAL_RISKS");
    }

    #[tokio::test]
    async fn step_budget_bounds_the_loop() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("SCAN_DOC", json!({}))]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().with_max_steps(3).run(&doc()).await.unwrap();

        assert_eq!(f.planner.calls(), 3);
        assert_eq!(outcome.steps_used, 3);
        assert_eq!(outcome.finalization, Finalization::Fallback);
        assert_eq!(outcome.analyst_calls, 1);
        assert_eq!(outcome.critic_calls, 0);
    }

    #[tokio::test]
    async fn adjust_k_changes_width_without_retrieving() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[
                ("ADJUST_K", json!({})),
                ("RETRIEVE_GOLD", json!({})),
                ("ADJUST_K", json!({})),
                ("RETRIEVE_GOLD", json!({"k": 0})),
            ]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        // 5 -> 8, retrieve at 8, 8 -> 10 (clamped), k=0 treated as omitted.
        assert_eq!(f.retriever.queries().iter().map(|(_, k)| *k).collect::<Vec<_>>(), vec![8, 10]);
        assert_eq!(outcome.precedents.len(), 10);
        assert_eq!(outcome.finalization, Finalization::Fallback);

        let snapshots = f.planner.snapshots();
        assert_eq!(snapshots[1]["scratchpad"]["k"], 8);
        assert_eq!(snapshots[1]["scratchpad"]["precedent_count"], 0);
        assert_eq!(snapshots[2]["scratchpad"]["precedent_count"], 8);
    }

    #[tokio::test]
    async fn undecodable_fallback_yields_sentinel() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("FINALIZE", json!({}))]),
            ScriptedAnalyst::new(&["Lo siento, no puedo ayudar."]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        match &outcome.dictamen {
            Dictamen::Undecodable { error, raw_output } => {
                assert_eq!(error, UNDECODABLE_ERROR);
                assert_eq!(raw_output, "Lo siento, no puedo ayudar.");
            }
            other => panic!("expected sentinel, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn strict_grounding_rejects_paraphrase_approved_by_critic() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("EVAL_RISKS", json!({}))]),
            ScriptedAnalyst::new(&[PARAPHRASED, GROUNDED]),
            ScriptedCritic::approving(),
        );
        let settings = AgentSettings {
            strict_grounding: true,
            ..AgentSettings::default()
        };

        let outcome = f.orchestrator().with_settings(settings).run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::Repaired);
        assert_eq!(outcome.dictamen, Dictamen::from_raw(GROUNDED));
        assert!(f.analyst.prompts()[1].contains("evidencia_resolucion"));
    }

    #[tokio::test]
    async fn lenient_grounding_records_issue_without_changing_verdict() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("EVAL_RISKS", json!({}))]),
            ScriptedAnalyst::new(&[PARAPHRASED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();

        assert_eq!(outcome.finalization, Finalization::CriticApproved);
        let grounding = outcome.trace.of_kind(TraceKind::Grounding).next().unwrap();
        assert!(grounding.content.starts_with("1 problemas"));
    }

    #[tokio::test]
    async fn empty_document_is_data_error() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("FINALIZE", json!({}))]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let err = f
            .orchestrator()
            .run(&DocumentRecord::new("vacío", "  \n "))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Data { .. }));
        assert_eq!(f.planner.calls(), 0);
    }

    #[tokio::test]
    async fn outcome_serializes_with_trace() {
        let f = Fixture::new(
            ScriptedPlanner::actions(&[("RETRIEVE_GOLD", json!({"k": 2})), ("EVAL_RISKS", json!({}))]),
            ScriptedAnalyst::new(&[GROUNDED]),
            ScriptedCritic::approving(),
        );

        let outcome = f.orchestrator().run(&doc()).await.unwrap();
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["finalization"], "critic_approved");
        assert_eq!(json["dictamen"]["riesgos"][0]["tipo"], "falta_ley_19886");
        assert!(json["trace"]["entries"].as_array().unwrap().len() >= 6);
    }
}
