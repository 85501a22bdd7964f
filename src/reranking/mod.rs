//! Precision reranking: cross-encoder scoring of (query, passage) pairs.
//!
//! Rerank scores are on an independent scale from coarse vector distances;
//! higher means more relevant, and scores for irrelevant pairs are
//! typically negative.

pub mod scorer;

pub use scorer::CrossEncoder;

use anyhow::Result;

/// Scores (query, passage) pairs for relevance
pub trait PairScorer: Send + Sync {
    /// Score each passage against the query; one score per passage,
    /// higher is more relevant
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>>;
}
