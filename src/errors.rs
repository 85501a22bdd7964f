//! Error types for the NyayaSetu pipeline.
//!
//! Startup failures (empty corpus, model load) are fatal: the pipeline
//! refuses to construct and the process exits. Query-time failures are
//! surfaced to the caller as descriptive errors so later queries can
//! still succeed. An empty retrieval result is NOT an error.

use thiserror::Error;

/// Main error type for the assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No passages available to index; the pipeline must not initialize
    #[error("knowledge base is empty: no passages available to index")]
    EmptyCorpus,

    /// An embedding/reranking/generation model failed to load
    #[error("failed to load model '{model}': {reason}")]
    ModelLoad { model: String, reason: String },

    /// Query-time retrieval failure (query embedding or rerank scoring)
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// The generative call failed
    #[error("generation failed: {0}")]
    Generation(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Corpus loading errors
    #[error("corpus error: {0}")]
    Corpus(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

impl AssistantError {
    /// Whether the error is fatal at startup (process must not serve queries)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AssistantError::EmptyCorpus | AssistantError::ModelLoad { .. }
        )
    }
}
