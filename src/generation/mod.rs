//! Answer generation with a local causal language model.

pub mod engine;

pub use engine::GenerationEngine;

use anyhow::Result;

/// Generates an answer continuation for an assembled prompt.
///
/// Implementations must return only newly generated text, never any part
/// of the prompt itself.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}
