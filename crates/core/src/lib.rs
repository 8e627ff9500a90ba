//! # Dictamen Core
//!
//! Domain types, capability traits, and error definitions for the Dictamen
//! procurement-award risk review system. This crate does no I/O: it defines
//! the domain model that the retrieval, provider, and agent crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! Every external capability (LLM provider, precedent retrieval) is a trait
//! here. Implementations live in their own crates, so the orchestration loop
//! can be driven by deterministic stand-ins in tests.

pub mod catalog;
pub mod decode;
pub mod document;
pub mod error;
pub mod grounding;
pub mod message;
pub mod provider;
pub mod report;
pub mod retriever;

// Re-export key types at crate root for ergonomics
pub use catalog::RiskCatalog;
pub use document::{DocumentRecord, PrecedentRecord};
pub use error::{Error, ProviderError, Result, RetrievalError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use report::{AnalystOutput, CriticIssue, CriticVerdict, Dictamen, RiskEntry};
pub use retriever::PrecedentRetriever;
