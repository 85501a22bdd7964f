//! Pipeline orchestration: wires corpus, index, retriever, prompt assembly,
//! and generation into a single `ask` call.
//!
//! The assistant is an explicit, immutable context object: models and the
//! embedding index are built exactly once at construction and shared
//! read-only by every query. Construction fails fast on an empty corpus or
//! a model-load failure; after that the only states are Ready and gone.

use std::sync::Arc;

use candle_core::Device;
use serde::{Deserialize, Serialize};

use crate::corpus::PassageStore;
use crate::embedding::{EmbeddingEngine, TextEmbedder};
use crate::errors::{AssistantError, Result};
use crate::generation::{AnswerGenerator, GenerationEngine};
use crate::language::Language;
use crate::prompt::PromptAssembler;
use crate::reranking::{CrossEncoder, PairScorer};
use crate::retrieval::{RetrievalParams, ScoredPassage, TwoStageRetriever};
use crate::telemetry::{StageTimer, StageTimings};

/// Fixed reply when no passage clears the relevance threshold
pub const FALLBACK_ANSWER: &str = "Sorry, I could not find relevant legal documents.";

/// Model identifiers and pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub embedder_model: String,
    pub reranker_model: String,
    pub generator_model: String,
    pub max_new_tokens: usize,
    pub retrieval: RetrievalParams,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            embedder_model: crate::embedding::engine::DEFAULT_EMBEDDER_ID.to_string(),
            reranker_model: crate::reranking::scorer::DEFAULT_RERANKER_ID.to_string(),
            generator_model: crate::generation::engine::DEFAULT_GENERATOR_ID.to_string(),
            max_new_tokens: crate::generation::engine::DEFAULT_MAX_NEW_TOKENS,
            retrieval: RetrievalParams::default(),
        }
    }
}

/// Diagnostics snapshot for the `info` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub device: String,
    pub corpus_size: usize,
    pub generator_model: String,
}

/// Result of one query, with retrieval detail and timings
#[derive(Debug, Clone)]
pub struct AskReport {
    pub answer: String,
    pub passages: Vec<ScoredPassage>,
    pub timings: StageTimings,
}

/// The assembled question-answering pipeline
pub struct LegalAssistant {
    retriever: TwoStageRetriever,
    assembler: PromptAssembler,
    generator: Box<dyn AnswerGenerator>,
    device_label: String,
    generator_model: String,
}

impl LegalAssistant {
    /// Load all models and build the index over `store`.
    ///
    /// Fatal on an empty store (`EmptyCorpus`) and on any model-load
    /// failure (`ModelLoad`); the caller must not serve queries after
    /// either.
    pub fn load(store: PassageStore, config: &AssistantConfig) -> Result<Self> {
        if store.is_empty() {
            return Err(AssistantError::EmptyCorpus);
        }

        let device = select_device();
        let device_label = if device.is_cuda() { "cuda" } else { "cpu" }.to_string();

        let embedder = EmbeddingEngine::load(&config.embedder_model, &device).map_err(|e| {
            AssistantError::ModelLoad {
                model: config.embedder_model.clone(),
                reason: e.to_string(),
            }
        })?;
        let scorer = CrossEncoder::load(&config.reranker_model, &device).map_err(|e| {
            AssistantError::ModelLoad {
                model: config.reranker_model.clone(),
                reason: e.to_string(),
            }
        })?;
        let generator =
            GenerationEngine::load(&config.generator_model, &device, config.max_new_tokens)
                .map_err(|e| AssistantError::ModelLoad {
                    model: config.generator_model.clone(),
                    reason: e.to_string(),
                })?;

        Self::with_components(
            store,
            Arc::new(embedder),
            Arc::new(scorer),
            Box::new(generator),
            config.retrieval.clone(),
            device_label,
            config.generator_model.clone(),
        )
    }

    /// Assemble a pipeline from pre-built components.
    ///
    /// The seam `load` goes through; also what tests use to substitute
    /// deterministic stand-ins for the model engines.
    pub fn with_components(
        store: PassageStore,
        embedder: Arc<dyn TextEmbedder>,
        scorer: Arc<dyn PairScorer>,
        generator: Box<dyn AnswerGenerator>,
        retrieval: RetrievalParams,
        device_label: String,
        generator_model: String,
    ) -> Result<Self> {
        let retriever =
            TwoStageRetriever::build(Arc::new(store), embedder, scorer, retrieval)?;

        Ok(Self {
            retriever,
            assembler: PromptAssembler::new(),
            generator,
            device_label,
            generator_model,
        })
    }

    /// Answer a question in the language named by `language_code`.
    ///
    /// Unknown codes silently fall back to English. When retrieval comes
    /// back empty the fixed fallback string is returned and the generator
    /// is never invoked; that is a normal outcome, not an error.
    pub fn ask(&self, query: &str, language_code: &str) -> Result<String> {
        self.ask_with_report(query, language_code)
            .map(|report| report.answer)
    }

    /// Answer a question, returning retrieval detail and stage timings
    pub fn ask_with_report(&self, query: &str, language_code: &str) -> Result<AskReport> {
        let language = Language::from_code(language_code);
        let total = StageTimer::start();

        let retrieval_timer = StageTimer::start();
        let passages = self.retriever.retrieve(query)?;
        let retrieval_ms = retrieval_timer.elapsed_ms();

        if passages.is_empty() {
            return Ok(AskReport {
                answer: FALLBACK_ANSWER.to_string(),
                passages,
                timings: StageTimings {
                    retrieval_ms,
                    generation_ms: 0,
                    total_ms: total.elapsed_ms(),
                },
            });
        }

        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        let prompt = self.assembler.assemble(query, &texts, language.name());

        let generation_timer = StageTimer::start();
        let answer = self
            .generator
            .generate(&prompt)
            .map_err(|e| AssistantError::Generation(e.to_string()))?;
        let generation_ms = generation_timer.elapsed_ms();

        Ok(AskReport {
            answer,
            passages,
            timings: StageTimings {
                retrieval_ms,
                generation_ms,
                total_ms: total.elapsed_ms(),
            },
        })
    }

    /// Diagnostics: device, corpus size, and generator identifier
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            device: self.device_label.clone(),
            corpus_size: self.retriever.corpus_size(),
            generator_model: self.generator_model.clone(),
        }
    }
}

fn select_device() -> Device {
    Device::cuda_if_available(0).unwrap_or(Device::Cpu)
}
