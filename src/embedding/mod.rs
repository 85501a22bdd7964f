//! Text embedding: fixed-width vector representations for similarity search.
//!
//! The `TextEmbedder` trait is the seam between the retrieval pipeline and
//! the concrete model runtime, so retrieval logic stays testable with
//! deterministic stand-ins.

pub mod engine;

pub use engine::EmbeddingEngine;

use anyhow::Result;

/// Produces dense embedding vectors for text.
///
/// A given embedder must return vectors of constant width; queries and
/// passages must be embedded by the same instance for distances to be
/// meaningful.
pub trait TextEmbedder: Send + Sync {
    /// Embed a batch of texts
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}
