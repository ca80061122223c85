//! Benchmark runner: warm-up and measurement phases over a completion engine.

use std::time::Instant;

use crate::engine::{CompletionEngine, GenerationParams};
use crate::error::Result;

use super::metrics::MetricsCollector;

/// Number of timed-but-discarded calls before measurement starts.
///
/// Always runs exactly this many times, independent of the configured
/// iteration count, so one-time engine costs (lazy initialization, cache
/// fill, kernel compilation) never land in the measured series.
pub const WARMUP_ITERATIONS: usize = 3;

/// Build the fixed prompt batch: `batch_size` identical copies of `prompt`
pub fn prompt_batch(prompt: &str, batch_size: usize) -> Vec<String> {
    vec![prompt.to_string(); batch_size]
}

/// Invoke one batch completion and return its wall-clock latency in seconds.
///
/// Any engine failure propagates unhandled; this is a performance probe, so
/// there is no retry and no timeout.
pub fn run_once<E: CompletionEngine>(
    engine: &mut E,
    prompts: &[String],
    params: &GenerationParams,
    print_output: bool,
) -> Result<f64> {
    let start = Instant::now();
    let results = engine.text_completion(prompts, params)?;

    if print_output {
        for (prompt, result) in prompts.iter().zip(results.iter()) {
            println!("{prompt}");
            println!("> {}", result.generation);
            println!("\n==================================\n");
        }
    }

    Ok(start.elapsed().as_secs_f64())
}

/// Drives the warm-up and measurement phases against an exclusively owned
/// engine handle. Calls are strictly sequential; the engine is never shared.
pub struct BenchmarkRunner<E> {
    engine: E,
    prompts: Vec<String>,
    params: GenerationParams,
    print_output: bool,
}

impl<E: CompletionEngine> BenchmarkRunner<E> {
    pub fn new(
        engine: E,
        prompts: Vec<String>,
        params: GenerationParams,
        print_output: bool,
    ) -> Self {
        Self {
            engine,
            prompts,
            params,
            print_output,
        }
    }

    /// Run exactly [`WARMUP_ITERATIONS`] calls, discarding their latencies
    pub fn warmup(&mut self) -> Result<()> {
        println!("Warming up the model ...");
        for _ in 0..WARMUP_ITERATIONS {
            run_once(
                &mut self.engine,
                &self.prompts,
                &self.params,
                self.print_output,
            )?;
        }
        Ok(())
    }

    /// Run exactly `iterations` measured calls, recording latency and
    /// derived throughput per iteration and printing both.
    pub fn measure(&mut self, iterations: usize) -> Result<MetricsCollector> {
        println!("Measuring perf ...");
        let mut metrics = MetricsCollector::new();

        for _ in 0..iterations {
            let latency = run_once(
                &mut self.engine,
                &self.prompts,
                &self.params,
                self.print_output,
            )?;
            let throughput = metrics.record(latency, self.prompts.len());
            println!("Batch completed with total latency: {latency:.3}s, QPS: {throughput:.3}");
        }

        Ok(metrics)
    }

    /// Batch size the runner was built with
    pub fn batch_size(&self) -> usize {
        self.prompts.len()
    }

    /// Borrow the engine, e.g. to inspect a mock after a run
    pub fn engine(&self) -> &E {
        &self.engine
    }
}
