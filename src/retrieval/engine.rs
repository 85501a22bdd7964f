//! Two-stage retrieval engine.
//!
//! Stage 1 embeds the query and runs an exact nearest-neighbor scan over the
//! flat index (cheap per candidate). Stage 2 scores each surviving
//! (query, passage) pair with the cross-encoder (expensive per pair, but
//! applied only to the small candidate set). Both stages are deterministic:
//! stable sorts, ties broken by corpus ordinal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::corpus::PassageStore;
use crate::embedding::TextEmbedder;
use crate::errors::{AssistantError, Result};
use crate::index::FlatIndex;
use crate::reranking::PairScorer;

/// Retrieval tuning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Candidates taken from the coarse vector search
    pub top_k: usize,
    /// Results returned after reranking
    pub rerank_top_n: usize,
    /// Rerank scores below this are dropped; irrelevant pairs score
    /// negative on the cross-encoder's logit scale
    pub min_score: f32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            rerank_top_n: 3,
            min_score: 0.0,
        }
    }
}

/// A retrieved passage with its rerank score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// Position of the passage in the corpus
    pub ordinal: usize,
    pub text: String,
    /// Cross-encoder relevance score (higher is more relevant)
    pub score: f32,
}

/// Two-stage retriever over an immutable passage store
pub struct TwoStageRetriever {
    store: Arc<PassageStore>,
    index: FlatIndex,
    embedder: Arc<dyn TextEmbedder>,
    scorer: Arc<dyn PairScorer>,
    params: RetrievalParams,
}

impl TwoStageRetriever {
    /// Encode every passage and build the flat index.
    ///
    /// Fails with `EmptyCorpus` if the store holds no passages; the
    /// pipeline must not start in that case.
    pub fn build(
        store: Arc<PassageStore>,
        embedder: Arc<dyn TextEmbedder>,
        scorer: Arc<dyn PairScorer>,
        params: RetrievalParams,
    ) -> Result<Self> {
        if store.is_empty() {
            return Err(AssistantError::EmptyCorpus);
        }

        let texts: Vec<&str> = store.iter().collect();
        let vectors = embedder
            .embed_batch(&texts)
            .map_err(|e| AssistantError::Retrieval(format!("corpus embedding failed: {}", e)))?;
        let index = FlatIndex::from_vectors(vectors)?;

        Ok(Self {
            store,
            index,
            embedder,
            scorer,
            params,
        })
    }

    /// Number of indexed passages
    pub fn corpus_size(&self) -> usize {
        self.index.len()
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    /// Retrieve the most relevant passages for a query.
    ///
    /// Returns at most `min(rerank_top_n, top_k, corpus_size)` passages in
    /// descending rerank-score order. An empty result means no passage
    /// cleared the relevance threshold; it is a normal outcome.
    pub fn retrieve(&self, query: &str) -> Result<Vec<ScoredPassage>> {
        self.retrieve_with_params(query, &self.params)
    }

    /// Retrieve with explicit parameters
    pub fn retrieve_with_params(
        &self,
        query: &str,
        params: &RetrievalParams,
    ) -> Result<Vec<ScoredPassage>> {
        // Stage 1: coarse vector search
        let query_vector = self
            .embedder
            .embed(query)
            .map_err(|e| AssistantError::Retrieval(format!("query embedding failed: {}", e)))?;
        let neighbors = self.index.search(&query_vector, params.top_k)?;

        let candidates: Vec<(usize, &str)> = neighbors
            .iter()
            .filter_map(|n| self.store.get(n.ordinal).map(|text| (n.ordinal, text)))
            .collect();

        // Stage 2: cross-encoder rerank
        let texts: Vec<&str> = candidates.iter().map(|(_, text)| *text).collect();
        let scores = self
            .scorer
            .score_pairs(query, &texts)
            .map_err(|e| AssistantError::Retrieval(format!("rerank scoring failed: {}", e)))?;

        let mut scored: Vec<ScoredPassage> = candidates
            .into_iter()
            .zip(scores)
            .filter(|(_, score)| *score >= params.min_score)
            .map(|((ordinal, text), score)| ScoredPassage {
                ordinal,
                text: text.to_string(),
                score,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        scored.truncate(params.rerank_top_n);

        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result as AnyResult;

    /// Deterministic bag-of-words hash embedder for tests
    struct HashEmbedder {
        dim: usize,
    }

    impl TextEmbedder for HashEmbedder {
        fn embed_batch(&self, texts: &[&str]) -> AnyResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut v = vec![0.0f32; self.dim];
                    for word in text.to_lowercase().split_whitespace() {
                        let mut h: usize = 5381;
                        for b in word.bytes() {
                            h = h.wrapping_mul(33).wrapping_add(b as usize);
                        }
                        v[h % self.dim] += 1.0;
                    }
                    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
                    if norm > 0.0 {
                        v.iter_mut().for_each(|x| *x /= norm);
                    }
                    v
                })
                .collect())
        }
    }

    /// Word-overlap scorer standing in for the cross-encoder
    struct OverlapScorer;

    impl PairScorer for OverlapScorer {
        fn score_pairs(&self, query: &str, passages: &[&str]) -> AnyResult<Vec<f32>> {
            let query_words: Vec<String> = query
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            Ok(passages
                .iter()
                .map(|passage| {
                    let passage_lower = passage.to_lowercase();
                    let overlap = query_words
                        .iter()
                        .filter(|w| w.len() > 3 && passage_lower.contains(*w))
                        .count();
                    overlap as f32 - 0.5
                })
                .collect())
        }
    }

    fn build_retriever(passages: Vec<&str>, params: RetrievalParams) -> Result<TwoStageRetriever> {
        let store = Arc::new(PassageStore::new(
            passages.into_iter().map(str::to_string).collect(),
        ));
        TwoStageRetriever::build(
            store,
            Arc::new(HashEmbedder { dim: 64 }),
            Arc::new(OverlapScorer),
            params,
        )
    }

    #[test]
    fn test_build_empty_store_fails() {
        let result = build_retriever(Vec::new(), RetrievalParams::default());
        assert!(matches!(result, Err(AssistantError::EmptyCorpus)));
    }

    #[test]
    fn test_corpus_size_matches_store() {
        let retriever = build_retriever(
            vec!["one passage here", "another passage here"],
            RetrievalParams::default(),
        )
        .unwrap();
        assert_eq!(retriever.corpus_size(), 2);
    }

    #[test]
    fn test_retrieve_ranks_matching_passage_first() {
        let retriever = build_retriever(
            vec![
                "The monsoon season brings heavy rainfall to coastal regions.",
                "Driving without a license carries a fine under the Motor Vehicles Act.",
                "Cricket is the most popular sport in the country.",
            ],
            RetrievalParams::default(),
        )
        .unwrap();

        let results = retriever
            .retrieve("What is the fine for driving without a license?")
            .unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].ordinal, 1);
    }

    #[test]
    fn test_retrieve_result_count_bounded() {
        let retriever = build_retriever(
            vec![
                "license fine driving vehicles roads",
                "license fine driving vehicles traffic",
                "license fine driving vehicles penalty",
                "license fine driving vehicles court",
            ],
            RetrievalParams {
                top_k: 3,
                rerank_top_n: 2,
                min_score: 0.0,
            },
        )
        .unwrap();

        let results = retriever.retrieve("license fine driving").unwrap();
        assert!(results.len() <= 2);
    }

    #[test]
    fn test_retrieve_returns_available_when_top_k_exceeds_corpus() {
        let retriever = build_retriever(
            vec!["driving license fine passage"],
            RetrievalParams {
                top_k: 50,
                rerank_top_n: 10,
                min_score: 0.0,
            },
        )
        .unwrap();

        let results = retriever.retrieve("driving license fine").unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_retrieve_scores_non_increasing() {
        let retriever = build_retriever(
            vec![
                "driving license fine penalty vehicles act",
                "driving license only",
                "completely unrelated gardening advice about tomato plants",
            ],
            RetrievalParams {
                top_k: 3,
                rerank_top_n: 3,
                min_score: -10.0,
            },
        )
        .unwrap();

        let results = retriever
            .retrieve("driving license fine penalty")
            .unwrap();
        assert!(results
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_retrieve_is_idempotent() {
        let retriever = build_retriever(
            vec![
                "driving license fine penalty vehicles",
                "property registration stamp duty rules",
                "consumer protection defective goods refund",
            ],
            RetrievalParams::default(),
        )
        .unwrap();

        let first = retriever.retrieve("defective goods refund").unwrap();
        let second = retriever.retrieve("defective goods refund").unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.ordinal, b.ordinal);
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn test_retrieve_empty_when_nothing_clears_threshold() {
        let retriever = build_retriever(
            vec![
                "gardening advice about tomato plants",
                "recipes for lentil soup and flatbread",
            ],
            RetrievalParams::default(),
        )
        .unwrap();

        // no query word appears in any passage: overlap scores are negative
        let results = retriever.retrieve("quantum cryptography patents").unwrap();
        assert!(results.is_empty());
    }
}
