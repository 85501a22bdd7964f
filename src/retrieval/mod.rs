//! Two-stage retrieval: coarse vector search narrowed by cross-encoder
//! reranking.

pub mod engine;

pub use engine::{RetrievalParams, ScoredPassage, TwoStageRetriever};
