//! Gemma causal-LM generation engine running locally via Candle.
//!
//! The prompt's token length is recorded before the forward pass and only
//! tokens produced after it are decoded, so the returned answer never
//! re-emits prompt text. Sampling is greedy, which keeps generation
//! deterministic for a fixed model and prompt.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::gemma::{Config, Model};
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::generation::AnswerGenerator;

/// Default generative model
pub const DEFAULT_GENERATOR_ID: &str = "google/gemma-2b-it";

/// Default cap on newly generated tokens per answer
pub const DEFAULT_MAX_NEW_TOKENS: usize = 200;

const SAMPLE_SEED: u64 = 299792458;

/// Causal-LM generation engine
pub struct GenerationEngine {
    // KV cache lives inside the model; queries are serialized through the lock
    model: Mutex<Model>,
    tokenizer: Tokenizer,
    device: Device,
    max_new_tokens: usize,
    eos_tokens: Vec<u32>,
}

impl GenerationEngine {
    /// Load the generative model from the HuggingFace Hub
    pub fn load(model_id: &str, device: &Device, max_new_tokens: usize) -> Result<Self> {
        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .context("Failed to download model config")?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weight_paths = fetch_weight_files(&repo)?;

        let config_contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&config_contents).context("Failed to parse model config")?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&weight_paths, DType::F32, device)
                .context("Failed to load model weights")?
        };
        let model = Model::new(false, &config, vb).context("Failed to create Gemma model")?;

        // Instruction-tuned checkpoints close turns with <end_of_turn>
        let eos_tokens: Vec<u32> = ["<eos>", "<end_of_turn>"]
            .iter()
            .filter_map(|t| tokenizer.token_to_id(t))
            .collect();
        if eos_tokens.is_empty() {
            anyhow::bail!("tokenizer defines no end-of-sequence token");
        }

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device: device.clone(),
            max_new_tokens,
            eos_tokens,
        })
    }

    pub fn max_new_tokens(&self) -> usize {
        self.max_new_tokens
    }

    fn run(&self, prompt: &str) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| anyhow::anyhow!("Prompt tokenization failed: {}", e))?;
        let prompt_tokens = encoding.get_ids().to_vec();
        let prompt_len = prompt_tokens.len();

        let mut model = self
            .model
            .lock()
            .map_err(|_| anyhow::anyhow!("generation engine lock poisoned"))?;
        model.clear_kv_cache();

        let mut logits_processor = LogitsProcessor::new(SAMPLE_SEED, None, None);
        let mut tokens = prompt_tokens;
        let mut generated: Vec<u32> = Vec::new();

        for step in 0..self.max_new_tokens {
            // full prompt on the first pass, then one token at a time
            let context_size = if step > 0 { 1 } else { tokens.len() };
            let start_pos = tokens.len().saturating_sub(context_size);
            let input = Tensor::new(&tokens[start_pos..], &self.device)?.unsqueeze(0)?;

            let logits = model.forward(&input, start_pos)?;
            let logits = logits.squeeze(0)?.squeeze(0)?.to_dtype(DType::F32)?;

            let next_token = logits_processor.sample(&logits)?;
            if self.eos_tokens.contains(&next_token) {
                break;
            }

            tokens.push(next_token);
            generated.push(next_token);
        }

        debug_assert_eq!(tokens.len(), prompt_len + generated.len());

        let answer = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| anyhow::anyhow!("Failed to decode answer: {}", e))?;

        Ok(answer.trim().to_string())
    }
}

impl AnswerGenerator for GenerationEngine {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.run(prompt)
    }
}

/// Fetch model weights, handling both single-file and sharded checkpoints
fn fetch_weight_files(repo: &ApiRepo) -> Result<Vec<PathBuf>> {
    if let Ok(single) = repo.get("model.safetensors") {
        return Ok(vec![single]);
    }

    let index_path = repo
        .get("model.safetensors.index.json")
        .context("Failed to download safetensors index")?;
    let index: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(index_path).context("Failed to read safetensors index")?,
    )
    .context("Failed to parse safetensors index")?;

    let weight_map = index
        .get("weight_map")
        .and_then(|v| v.as_object())
        .context("safetensors index has no weight_map")?;

    let mut files: Vec<String> = weight_map
        .values()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    files.sort();
    files.dedup();

    files
        .into_iter()
        .map(|file| {
            repo.get(&file)
                .with_context(|| format!("Failed to download weight shard {}", file))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptAssembler;

    #[test]
    #[ignore] // Integration test - requires model download and several GB of RAM
    fn test_generate_excludes_prompt_text() {
        let engine = GenerationEngine::load(DEFAULT_GENERATOR_ID, &Device::Cpu, 50)
            .expect("Failed to load generator");
        let prompt = PromptAssembler::new().assemble(
            "What is the penalty for driving without a license?",
            &["Section 3 of the Motor Vehicles Act prescribes a fine of five hundred rupees for driving without a license."],
            "English",
        );

        let answer = engine.generate(&prompt).expect("Generation failed");
        assert!(!answer.is_empty());
        assert!(!answer.contains("You are 'NyayaSetu'"));
        assert!(!answer.contains("CONTEXT:"));
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_generate_is_deterministic() {
        let engine = GenerationEngine::load(DEFAULT_GENERATOR_ID, &Device::Cpu, 20)
            .expect("Failed to load generator");
        let prompt = PromptAssembler::new().assemble("What is a contract?", &["A contract is an agreement enforceable by law."], "English");

        let first = engine.generate(&prompt).expect("Generation failed");
        let second = engine.generate(&prompt).expect("Generation failed");
        assert_eq!(first, second);
    }
}
