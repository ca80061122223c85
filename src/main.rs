use anyhow::Result;

use llama_perf::bench::{prompt_batch, BenchmarkReport, BenchmarkRunner};
use llama_perf::config::Config;
use llama_perf::engine::LlamaEngine;

fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = Config::load();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    tracing::info!(
        "Benchmarking {} | batch={} max_gen_len={} iterations={}",
        config.ckpt_dir.display(),
        config.max_batch_size,
        config.max_gen_len,
        config.test_iterations
    );

    // Engine construction failures (missing checkpoint, bad tokenizer) are
    // fatal and unhandled past this point.
    let engine = LlamaEngine::build(&config.engine_config())?;
    let prompts = prompt_batch(&config.prompt, config.max_batch_size);

    let mut runner = BenchmarkRunner::new(
        engine,
        prompts,
        config.generation_params(),
        config.print_output,
    );

    runner.warmup()?;
    let metrics = runner.measure(config.test_iterations)?;

    let report = BenchmarkReport::from_metrics(&metrics, config.max_batch_size);
    report.print_summary();
    if config.json {
        println!("{}", report.to_json());
    }

    Ok(())
}
