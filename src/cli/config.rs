//! Configuration management for NyayaSetu
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.nyayasetu/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::corpus::loader::MIN_PASSAGE_CHARS;
use crate::errors::{AssistantError, Result};
use crate::pipeline::AssistantConfig;
use crate::retrieval::RetrievalParams;

/// Complete configuration for NyayaSetu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelsConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub corpus: CorpusConfig,
}

/// Model identifiers (HuggingFace Hub)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub embedder: String,
    pub reranker: String,
    pub generator: String,
}

/// Retrieval tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub rerank_top_n: usize,
    pub min_score: f32,
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_new_tokens: usize,
}

/// Corpus loading settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub database_dir: String,
    pub min_passage_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
            corpus: CorpusConfig::default(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            embedder: crate::embedding::engine::DEFAULT_EMBEDDER_ID.to_string(),
            reranker: crate::reranking::scorer::DEFAULT_RERANKER_ID.to_string(),
            generator: crate::generation::engine::DEFAULT_GENERATOR_ID.to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let params = RetrievalParams::default();
        Self {
            top_k: params.top_k,
            rerank_top_n: params.rerank_top_n,
            min_score: params.min_score,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: crate::generation::engine::DEFAULT_MAX_NEW_TOKENS,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            database_dir: "database".to_string(),
            min_passage_chars: MIN_PASSAGE_CHARS,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AssistantError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| AssistantError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".nyayasetu").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(AssistantError::Config(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.rerank_top_n == 0 {
            return Err(AssistantError::Config(
                "rerank_top_n must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.rerank_top_n > self.retrieval.top_k {
            return Err(AssistantError::Config(
                "rerank_top_n must not exceed top_k".to_string(),
            ));
        }

        if self.generation.max_new_tokens == 0 {
            return Err(AssistantError::Config(
                "max_new_tokens must be greater than 0".to_string(),
            ));
        }

        if self.corpus.min_passage_chars == 0 {
            return Err(AssistantError::Config(
                "min_passage_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AssistantError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AssistantError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AssistantError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get the document directory path
    pub fn database_dir(&self) -> PathBuf {
        Self::expand_path(&self.corpus.database_dir)
    }

    /// Pipeline view of this configuration
    pub fn assistant_config(&self) -> AssistantConfig {
        AssistantConfig {
            embedder_model: self.models.embedder.clone(),
            reranker_model: self.models.reranker.clone(),
            generator_model: self.models.generator.clone(),
            max_new_tokens: self.generation.max_new_tokens,
            retrieval: RetrievalParams {
                top_k: self.retrieval.top_k,
                rerank_top_n: self.retrieval.rerank_top_n,
                min_score: self.retrieval.min_score,
            },
        }
    }
}
