//! Shared test helpers: scripted, call-counting stand-ins for every
//! capability the orchestrator consumes.

use async_trait::async_trait;
use dictamen_core::error::{ProviderError, RetrievalError};
use dictamen_core::message::Message;
use dictamen_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use dictamen_core::{PrecedentRecord, PrecedentRetriever};
use std::sync::Mutex;

use crate::analyst::Analyst;
use crate::critic::Critic;
use crate::planner::Planner;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn with_texts(texts: &[&str]) -> Self {
        Self {
            responses: Mutex::new(texts.iter().map(|t| Ok(make_text_response(t))).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose only call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            responses: Mutex::new(vec![Err(error)]),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let count = requests.len();

        if count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                count,
                responses.len()
            );
        }

        requests.push(request);
        responses[count].clone()
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Replays scripted answers in order; the last answer repeats once the
/// script runs out.
struct Script {
    answers: Vec<String>,
    inputs: Mutex<Vec<String>>,
}

impl Script {
    fn new(answers: &[&str]) -> Self {
        assert!(!answers.is_empty(), "script needs at least one answer");
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            inputs: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, input: String) -> String {
        let mut inputs = self.inputs.lock().unwrap();
        let i = inputs.len().min(self.answers.len() - 1);
        inputs.push(input);
        self.answers[i].clone()
    }

    fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

/// Planner answering from a script; records the snapshots it saw.
pub struct ScriptedPlanner(Script);

impl ScriptedPlanner {
    pub fn new(answers: &[&str]) -> Self {
        Self(Script::new(answers))
    }

    /// Planner answering `{"action": name, "args": args}` for each entry.
    pub fn actions(actions: &[(&str, serde_json::Value)]) -> Self {
        let answers: Vec<String> = actions
            .iter()
            .map(|(name, args)| {
                serde_json::json!({"thought": format!("elijo {name}"), "action": name, "args": args})
                    .to_string()
            })
            .collect();
        let refs: Vec<&str> = answers.iter().map(String::as_str).collect();
        Self::new(&refs)
    }

    pub fn calls(&self) -> usize {
        self.0.calls()
    }

    pub fn snapshots(&self) -> Vec<serde_json::Value> {
        self.0
            .inputs()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn plan(
        &self,
        _system_prompt: &str,
        snapshot: &serde_json::Value,
    ) -> Result<String, ProviderError> {
        Ok(self.0.next(snapshot.to_string()))
    }
}

/// Analyst answering from a script; records the prompts it received.
pub struct ScriptedAnalyst(Script);

impl ScriptedAnalyst {
    pub fn new(answers: &[&str]) -> Self {
        Self(Script::new(answers))
    }

    pub fn calls(&self) -> usize {
        self.0.calls()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.0.inputs()
    }
}

#[async_trait]
impl Analyst for ScriptedAnalyst {
    async fn analyze(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(self.0.next(prompt.to_string()))
    }
}

/// Critic answering from a script; records the candidates it judged.
pub struct ScriptedCritic(Script);

impl ScriptedCritic {
    pub fn new(answers: &[&str]) -> Self {
        Self(Script::new(answers))
    }

    pub fn approving() -> Self {
        Self::new(&[r#"{"ok": true, "errors": []}"#])
    }

    pub fn rejecting() -> Self {
        Self::new(&[
            r#"{"ok": false, "errors": [{"field": "riesgos[0].evidencia_resolucion", "reason": "no es literal", "suggestion": "citar el texto exacto"}]}"#,
        ])
    }

    pub fn calls(&self) -> usize {
        self.0.calls()
    }

    pub fn candidates(&self) -> Vec<String> {
        self.0.inputs()
    }
}

#[async_trait]
impl Critic for ScriptedCritic {
    async fn critique(&self, _document_text: &str, candidate: &str) -> Result<String, ProviderError> {
        Ok(self.0.next(candidate.to_string()))
    }
}

/// Retriever over a fixed list, returning the first `k` records.
pub struct StaticRetriever {
    records: Vec<PrecedentRecord>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticRetriever {
    pub fn new(records: Vec<PrecedentRecord>) -> Self {
        Self {
            records,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrecedentRetriever for StaticRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<PrecedentRecord>, RetrievalError> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        Ok(self.records.iter().take(k).cloned().collect())
    }

    fn size(&self) -> usize {
        self.records.len()
    }
}

pub fn precedent(id: &str, tags: &[&str]) -> PrecedentRecord {
    PrecedentRecord {
        doc_id: id.into(),
        risk_tags: tags.iter().map(|t| t.to_string()).collect(),
        curator_note: format!("nota del curador para {id}"),
        source_path: Some(format!("gold/{id}.pdf")),
    }
}

/// Ten gold precedents `G0..G9`.
pub fn gold_set() -> Vec<PrecedentRecord> {
    (0..10)
        .map(|i| precedent(&format!("G{i}"), &["falta_ley_19886"]))
        .collect()
}
