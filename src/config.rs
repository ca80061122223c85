use clap::Parser;
use std::path::PathBuf;

use crate::engine::{EngineConfig, GenerationParams};

/// llama-perf - fixed-batch latency/throughput probe for text generation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Checkpoint directory (config.json + safetensors weights)
    #[arg(long, env = "CKPT_DIR")]
    pub ckpt_dir: PathBuf,

    /// Path to tokenizer.json
    #[arg(long, env = "TOKENIZER_PATH")]
    pub tokenizer_path: PathBuf,

    /// Sampling temperature (0 selects greedy decoding)
    #[arg(long, env = "TEMPERATURE", default_value_t = 0.6)]
    pub temperature: f64,

    /// Nucleus sampling mass
    #[arg(long, env = "TOP_P", default_value_t = 0.9)]
    pub top_p: f64,

    /// Maximum total sequence length, prompt plus generation
    #[arg(long, env = "MAX_SEQ_LEN", default_value_t = 1024)]
    pub max_seq_len: usize,

    /// Maximum number of generated tokens per prompt
    #[arg(long, env = "MAX_GEN_LEN", default_value_t = 64)]
    pub max_gen_len: usize,

    /// Number of identical prompts per batch call
    #[arg(long, env = "MAX_BATCH_SIZE", default_value_t = 32)]
    pub max_batch_size: usize,

    /// Print each prompt and its generated continuation
    #[arg(long, env = "PRINT_OUTPUT")]
    pub print_output: bool,

    /// Number of measured iterations
    #[arg(long, env = "TEST_ITERATIONS", default_value_t = 10)]
    pub test_iterations: usize,

    /// Build the model with flash-attention kernels
    #[arg(long, env = "USE_FLASH_ATTN")]
    pub use_flash_attn: bool,

    /// Prompt text repeated across the batch
    #[arg(
        long,
        env = "PROMPT",
        default_value = "I believe the meaning of life is"
    )]
    pub prompt: String,

    /// Also print the report as JSON after the summary line
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Immutable run configuration, resolved once at startup
#[derive(Clone, Debug)]
pub struct Config {
    pub ckpt_dir: PathBuf,
    pub tokenizer_path: PathBuf,
    pub temperature: f64,
    pub top_p: f64,
    pub max_seq_len: usize,
    pub max_gen_len: usize,
    pub max_batch_size: usize,
    pub print_output: bool,
    pub test_iterations: usize,
    pub use_flash_attn: bool,
    pub prompt: String,
    pub json: bool,
    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > defaults.
    ///
    /// The harness performs no validation of its own; malformed values
    /// surface from the engine, missing required flags from the parser.
    pub fn load() -> Self {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_args(CliArgs::parse())
    }

    pub fn from_args(args: CliArgs) -> Self {
        Self {
            ckpt_dir: args.ckpt_dir,
            tokenizer_path: args.tokenizer_path,
            temperature: args.temperature,
            top_p: args.top_p,
            max_seq_len: args.max_seq_len,
            max_gen_len: args.max_gen_len,
            max_batch_size: args.max_batch_size,
            print_output: args.print_output,
            test_iterations: args.test_iterations,
            use_flash_attn: args.use_flash_attn,
            prompt: args.prompt,
            json: args.json,
            log_level: args.log_level,
        }
    }

    /// Construction parameters handed to the engine build
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            ckpt_dir: self.ckpt_dir.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            max_seq_len: self.max_seq_len,
            max_batch_size: self.max_batch_size,
            use_flash_attn: self.use_flash_attn,
        }
    }

    /// Generation-control scalars passed to every completion call
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_gen_len: self.max_gen_len,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}
