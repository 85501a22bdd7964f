//! BERT sentence-embedding engine running locally via Candle.

use anyhow::{Context, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{Tokenizer, TruncationParams};

use crate::embedding::TextEmbedder;

/// Default multilingual sentence-embedding model
pub const DEFAULT_EMBEDDER_ID: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

const MAX_SEQ_LEN: usize = 512;
const BATCH_SIZE: usize = 32;

/// Sentence embedding engine (mean-pooled BERT encoder)
pub struct EmbeddingEngine {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl EmbeddingEngine {
    /// Load the embedding model from the HuggingFace Hub (cached after the
    /// first download)
    pub fn load(model_id: &str, device: &Device) -> Result<Self> {
        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .context("Failed to download model config")?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weights_path = repo
            .get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&config_contents).context("Failed to parse model config")?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], candle_core::DType::F32, device)
                .context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config).context("Failed to create BERT model")?;

        Ok(Self {
            model,
            tokenizer,
            device: device.clone(),
        })
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);
        let batch_size = texts.len();

        // Pad sequences to the longest in the batch
        let mut padded_ids = vec![0u32; batch_size * max_len];
        let mut padded_mask = vec![0u32; batch_size * max_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            padded_ids[i * max_len..i * max_len + ids.len()].copy_from_slice(ids);
            padded_mask[i * max_len..i * max_len + mask.len()].copy_from_slice(mask);
        }

        let token_ids = Tensor::from_vec(padded_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(padded_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = Self::mean_pool(&hidden, &attention_mask)?;
        Ok(pooled.to_vec2::<f32>()?)
    }

    /// Mean pooling over the sequence dimension, weighted by attention mask
    fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(hidden.shape())?
            .to_dtype(hidden.dtype())?;

        let sum_hidden = (hidden * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum_hidden.broadcast_div(&sum_mask)?)
    }
}

impl TextEmbedder for EmbeddingEngine {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_SIZE) {
            vectors.extend(self.encode_batch(chunk)?);
        }
        Ok(vectors)
    }
}
