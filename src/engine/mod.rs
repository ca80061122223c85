//! Text-generation engine contract.
//!
//! The benchmark driver treats the engine as a black box: it is built once
//! from an [`EngineConfig`] and then invoked repeatedly through
//! [`CompletionEngine::text_completion`]. Two implementations ship with the
//! crate: [`LlamaEngine`] (candle-backed, loads a real checkpoint) and
//! [`MockEngine`] (simulated latency, used by tests).

pub mod llama;
pub mod mock;

pub use llama::LlamaEngine;
pub use mock::MockEngine;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Generation-control parameters passed to every completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum number of new tokens per prompt
    pub max_gen_len: usize,
    /// Sampling temperature (<= 0 selects greedy decoding)
    pub temperature: f64,
    /// Nucleus sampling mass in (0, 1]
    pub top_p: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_gen_len: 64,
            temperature: 0.6,
            top_p: 0.9,
        }
    }
}

/// One generated continuation, in the order of the submitted prompts
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text, not including the prompt
    pub generation: String,
    /// Number of tokens generated for this prompt
    pub generated_tokens: usize,
}

/// Construction parameters for the real engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Checkpoint directory (config.json + safetensors weights)
    pub ckpt_dir: PathBuf,
    /// Path to tokenizer.json
    pub tokenizer_path: PathBuf,
    /// Maximum total sequence length (prompt + generation)
    pub max_seq_len: usize,
    /// Largest prompt batch the engine accepts
    pub max_batch_size: usize,
    /// Build the model with flash-attention kernels
    pub use_flash_attn: bool,
}

/// Batch text-completion capability consumed by the benchmark driver.
///
/// Calls are issued strictly sequentially from a single owner; `&mut self`
/// encodes that the engine is stateful and not reentrant.
pub trait CompletionEngine {
    /// Generate a continuation for every prompt in the batch, in order.
    fn text_completion(
        &mut self,
        prompts: &[String],
        params: &GenerationParams,
    ) -> Result<Vec<Completion>>;
}
