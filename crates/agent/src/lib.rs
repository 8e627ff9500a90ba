//! The review loop of Dictamen.
//!
//! A Planner chooses, step by step, among a fixed set of actions:
//!
//! 1. **Retrieve** precedents similar to the document (`RETRIEVE_GOLD`)
//! 2. **Adjust** how many precedents to retrieve (`ADJUST_K`)
//! 3. **Evaluate**: the Analyst drafts a risk report, the Critic validates it,
//!    and one repair round runs on rejection (`EVAL_RISKS`)
//! 4. **Stop** (`FINALIZE`)
//!
//! The loop is bounded by a step budget. A run that ends without an
//! evaluation gets one forced Analyst call, so every run yields a Dictamen.

pub mod analyst;
pub mod critic;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod scratchpad;
pub mod trace;

#[cfg(test)]
mod test_helpers;

pub use analyst::{Analyst, LlmAnalyst, build_analyst_prompt, build_repair_prompt};
pub use critic::{Critic, LlmCritic};
pub use orchestrator::{Finalization, Orchestrator, RunOutcome};
pub use planner::{LlmPlanner, PlanAction, PlanDecision, Planner};
pub use prompts::PromptTemplates;
pub use scratchpad::Scratchpad;
pub use trace::{RunTrace, TraceEntry, TraceKind};
