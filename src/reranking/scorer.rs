//! Cross-encoder relevance scorer running locally via Candle.
//!
//! The model is a BERT sequence classifier: the query and passage are
//! encoded as one pair, the CLS state is passed through the pooler and a
//! single-logit classification head, and that logit is the relevance score.

use anyhow::{Context, Result};
use candle_core::{Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{Tokenizer, TruncationParams};

use crate::reranking::PairScorer;

/// Default cross-encoder reranking model
pub const DEFAULT_RERANKER_ID: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";

const MAX_SEQ_LEN: usize = 512;

/// Cross-encoder pair scorer
pub struct CrossEncoder {
    model: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl CrossEncoder {
    /// Load the reranking model from the HuggingFace Hub
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
        let raw: serde_json::Value =
            serde_json::from_str(&config_contents).context("Failed to parse model config")?;
        let hidden_size = raw
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .context("Model config has no hidden_size")? as usize;
        let config: Config =
            serde_json::from_value(raw).context("Failed to parse model config")?;

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

        // Sequence-classifier layout: encoder under "bert", then pooler and
        // single-logit classification head
        let model =
            BertModel::load(vb.pp("bert"), &config).context("Failed to create BERT model")?;
        let pooler = candle_nn::linear(hidden_size, hidden_size, vb.pp("bert").pp("pooler").pp("dense"))
            .context("Failed to load pooler weights")?;
        let classifier = candle_nn::linear(hidden_size, 1, vb.pp("classifier"))
            .context("Failed to load classifier weights")?;

        Ok(Self {
            model,
            pooler,
            classifier,
            tokenizer,
            device: device.clone(),
        })
    }

    fn score_one(&self, query: &str, passage: &str) -> Result<f32> {
        let encoding = self
            .tokenizer
            .encode((query, passage), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let seq_len = encoding.get_ids().len();
        let token_ids =
            Tensor::from_vec(encoding.get_ids().to_vec(), (1, seq_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(
            encoding.get_type_ids().to_vec(),
            (1, seq_len),
            &self.device,
        )?;
        let attention_mask = Tensor::from_vec(
            encoding.get_attention_mask().to_vec(),
            (1, seq_len),
            &self.device,
        )?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        // CLS state -> pooler (tanh) -> relevance logit
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logit = self.classifier.forward(&pooled)?;

        Ok(logit.squeeze(1)?.to_vec1::<f32>()?[0])
    }
}

impl PairScorer for CrossEncoder {
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        passages
            .iter()
            .map(|passage| self.score_one(query, passage))
            .collect()
    }
}
