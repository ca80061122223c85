//! Candle-backed llama engine.
//!
//! Loads a llama-family model from a local checkpoint directory (HuggingFace
//! layout: `config.json` plus one or more safetensors files) and a
//! `tokenizer.json`, then serves batch text completion. Attention, KV cache
//! and sampling all live in candle-transformers; this module only wires
//! loading, the per-prompt generation loop and decoding.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::llama::{
    Cache, Config as ModelConfig, Llama, LlamaConfig, LlamaEosToks,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::{Completion, CompletionEngine, EngineConfig, GenerationParams};
use crate::error::{EngineError, Result};

/// Fixed sampling seed so repeated iterations sample the same token paths
const SAMPLING_SEED: u64 = 42;

/// Long-lived engine handle: one model, one tokenizer, reused across calls
pub struct LlamaEngine {
    model: Llama,
    tokenizer: Tokenizer,
    model_config: ModelConfig,
    eos_token_id: Option<LlamaEosToks>,
    device: Device,
    dtype: DType,
    max_seq_len: usize,
    max_batch_size: usize,
}

impl LlamaEngine {
    /// Build the engine once: device selection, tokenizer, config, weights.
    ///
    /// Construction failures (missing checkpoint, malformed config) are
    /// fatal to the caller; there is no retry.
    pub fn build(config: &EngineConfig) -> Result<Self> {
        let device = Device::cuda_if_available(0)?;
        let dtype = if device.is_cuda() {
            DType::F16
        } else {
            DType::F32
        };
        info!("Using device {:?} with dtype {:?}", device, dtype);

        info!("Loading tokenizer from {}", config.tokenizer_path.display());
        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| EngineError::Tokenizer(e.to_string()))?;

        info!("Loading model config from {}", config.ckpt_dir.display());
        let config_file = config.ckpt_dir.join("config.json");
        let llama_config: LlamaConfig = serde_json::from_slice(&std::fs::read(&config_file)?)?;
        let model_config = llama_config.into_config(config.use_flash_attn);

        let eos_token_id = model_config
            .eos_token_id
            .clone()
            .or_else(|| tokenizer.token_to_id("</s>").map(LlamaEosToks::Single));

        let filenames = checkpoint_files(&config.ckpt_dir)?;
        info!("Loading {} safetensor file(s)", filenames.len());
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&filenames, dtype, &device)? };
        let model = Llama::load(vb, &model_config)?;

        info!(
            "Model loaded: vocab={} hidden={} layers={}",
            model_config.vocab_size, model_config.hidden_size, model_config.num_hidden_layers
        );

        Ok(Self {
            model,
            tokenizer,
            model_config,
            eos_token_id,
            device,
            dtype,
            max_seq_len: config.max_seq_len,
            max_batch_size: config.max_batch_size,
        })
    }

    fn encode(&self, prompt: &str) -> Result<Vec<u32>> {
        self.tokenizer
            .encode(prompt, true)
            .map_err(|e| EngineError::Tokenizer(e.to_string()))
            .map(|enc| enc.get_ids().to_vec())
    }

    fn decode(&self, tokens: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(tokens, true)
            .map_err(|e| EngineError::Tokenizer(e.to_string()))
    }

    /// Generate a continuation for a single prompt with a fresh KV cache.
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Completion> {
        let mut tokens = self.encode(prompt)?;
        if tokens.len() >= self.max_seq_len {
            tokens.truncate(self.max_seq_len.saturating_sub(1));
        }
        let max_new_tokens = params.max_gen_len.min(self.max_seq_len - tokens.len());

        let mut cache = Cache::new(true, self.dtype, &self.model_config, &self.device)?;
        let mut logits_processor = logits_processor(SAMPLING_SEED, params.temperature, params.top_p);
        let mut generated: Vec<u32> = Vec::with_capacity(max_new_tokens);
        let mut index_pos = 0;

        for index in 0..max_new_tokens {
            // Prefill the whole prompt on the first step, then decode one
            // token at a time against the KV cache.
            let (ctxt, context_index) = if index == 0 {
                (&tokens[..], 0)
            } else {
                (&tokens[tokens.len() - 1..], index_pos)
            };
            let input = Tensor::new(ctxt, &self.device)?.unsqueeze(0)?;
            let logits = self.model.forward(&input, context_index, &mut cache)?;
            let logits = logits.squeeze(0)?;
            index_pos += ctxt.len();

            let next_token = logits_processor.sample(&logits)?;
            match self.eos_token_id {
                Some(LlamaEosToks::Single(eos)) if next_token == eos => break,
                Some(LlamaEosToks::Multiple(ref eos)) if eos.contains(&next_token) => break,
                _ => (),
            }
            tokens.push(next_token);
            generated.push(next_token);
        }

        let generation = self.decode(&generated)?;
        Ok(Completion {
            generation,
            generated_tokens: generated.len(),
        })
    }
}

impl CompletionEngine for LlamaEngine {
    fn text_completion(
        &mut self,
        prompts: &[String],
        params: &GenerationParams,
    ) -> Result<Vec<Completion>> {
        if prompts.len() > self.max_batch_size {
            return Err(EngineError::BatchTooLarge {
                given: prompts.len(),
                max: self.max_batch_size,
            });
        }

        let start = Instant::now();
        let mut results = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            results.push(self.generate(prompt, params)?);
        }

        let total_tokens: usize = results.iter().map(|c| c.generated_tokens).sum();
        debug!(
            "Batch of {} prompts generated {} tokens ({:.1} tok/s)",
            prompts.len(),
            total_tokens,
            total_tokens as f64 / start.elapsed().as_secs_f64()
        );
        Ok(results)
    }
}

/// Resolve the safetensors files under a checkpoint directory.
///
/// Sharded checkpoints carry a `model.safetensors.index.json` weight map;
/// single-file checkpoints just have `*.safetensors` entries.
fn checkpoint_files(ckpt_dir: &Path) -> Result<Vec<PathBuf>> {
    let index_file = ckpt_dir.join("model.safetensors.index.json");
    if index_file.is_file() {
        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&index_file)?)?;
        let weight_map = json
            .get("weight_map")
            .and_then(|v| v.as_object())
            .ok_or_else(|| {
                EngineError::Checkpoint(format!("no weight_map in {}", index_file.display()))
            })?;

        let mut shards = HashSet::new();
        for value in weight_map.values() {
            if let Some(file) = value.as_str() {
                shards.insert(file.to_string());
            }
        }
        let mut filenames: Vec<PathBuf> = shards.into_iter().map(|f| ckpt_dir.join(f)).collect();
        filenames.sort();
        return Ok(filenames);
    }

    let mut filenames: Vec<PathBuf> = std::fs::read_dir(ckpt_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "safetensors"))
        .collect();
    filenames.sort();

    if filenames.is_empty() {
        return Err(EngineError::Checkpoint(format!(
            "no safetensors files in {}",
            ckpt_dir.display()
        )));
    }
    Ok(filenames)
}

/// Map the generation-control scalars onto a candle sampling strategy
fn logits_processor(seed: u64, temperature: f64, top_p: f64) -> LogitsProcessor {
    let sampling = if temperature <= 0.0 {
        Sampling::ArgMax
    } else {
        Sampling::TopP {
            p: top_p,
            temperature,
        }
    };
    LogitsProcessor::from_sampling(seed, sampling)
}
