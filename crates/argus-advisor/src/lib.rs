//! Argus Advisor - LLM provider adapters for the escalation pipeline

pub mod anthropic;
pub mod ollama;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use provider::{augment_for_schema, AdvisorError, AdvisorProvider, AdvisorResult};
pub use types::*;
