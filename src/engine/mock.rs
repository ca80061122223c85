//! Simulated engine for tests and dry runs.
//!
//! Stands in for the real model so the driver's warm-up/measurement
//! sequencing can be exercised without loading a checkpoint. Latency is
//! simulated by sleeping; failures are scripted deterministically.

use std::time::Duration;

use super::{Completion, CompletionEngine, GenerationParams};
use crate::error::{EngineError, Result};

/// Completion engine that sleeps for a fixed latency and returns canned text
pub struct MockEngine {
    latency: Duration,
    generation: String,
    fail_after: Option<usize>,
    calls: usize,
    batch_sizes: Vec<usize>,
}

impl MockEngine {
    /// Create a mock that sleeps `latency` per call
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            generation: "a simulated continuation".to_string(),
            fail_after: None,
            calls: 0,
            batch_sizes: Vec::new(),
        }
    }

    /// Override the canned generation text
    pub fn with_generation(mut self, text: impl Into<String>) -> Self {
        self.generation = text.into();
        self
    }

    /// Fail every call after the first `n` successful ones
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Total number of completion calls served (including the failing one)
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Batch size of every call, in call order
    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }
}

impl CompletionEngine for MockEngine {
    fn text_completion(
        &mut self,
        prompts: &[String],
        params: &GenerationParams,
    ) -> Result<Vec<Completion>> {
        self.calls += 1;
        self.batch_sizes.push(prompts.len());

        if let Some(limit) = self.fail_after {
            if self.calls > limit {
                return Err(EngineError::Checkpoint("simulated engine failure".to_string()));
            }
        }

        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        Ok(prompts
            .iter()
            .map(|_| Completion {
                generation: self.generation.clone(),
                generated_tokens: params.max_gen_len,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_completion_per_prompt() {
        let mut engine = MockEngine::new(Duration::ZERO).with_generation("hello");
        let prompts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = engine
            .text_completion(&prompts, &GenerationParams::default())
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|c| c.generation == "hello"));
        assert_eq!(engine.calls(), 1);
        assert_eq!(engine.batch_sizes(), &[3]);
    }

    #[test]
    fn test_fail_after() {
        let mut engine = MockEngine::new(Duration::ZERO).fail_after(2);
        let prompts = vec!["p".to_string()];
        let params = GenerationParams::default();

        assert!(engine.text_completion(&prompts, &params).is_ok());
        assert!(engine.text_completion(&prompts, &params).is_ok());
        assert!(engine.text_completion(&prompts, &params).is_err());
        assert_eq!(engine.calls(), 3);
    }
}
