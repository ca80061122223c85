// Error handling module
// Typed engine failures; everything is fatal and propagates to main

use thiserror::Error;

/// Errors surfaced by engine construction and text completion
#[derive(Error, Debug)]
pub enum EngineError {
    /// Checkpoint directory is missing or malformed
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Tokenizer file failed to load or encode/decode failed
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Prompt batch exceeds the capacity the engine was built with
    #[error("Batch of {given} prompts exceeds max_batch_size {max}")]
    BatchTooLarge { given: usize, max: usize },

    /// Model execution error from the inference backend
    #[error("Model error: {0}")]
    Model(#[from] candle_core::Error),

    /// Filesystem error while reading checkpoint files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed model config.json
    #[error("Model config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::Checkpoint("no safetensors in /tmp/ckpt".to_string());
        assert_eq!(
            err.to_string(),
            "Checkpoint error: no safetensors in /tmp/ckpt"
        );

        let err = EngineError::Tokenizer("bad tokenizer.json".to_string());
        assert_eq!(err.to_string(), "Tokenizer error: bad tokenizer.json");

        let err = EngineError::BatchTooLarge { given: 64, max: 32 };
        assert_eq!(
            err.to_string(),
            "Batch of 64 prompts exceeds max_batch_size 32"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
    }
}
