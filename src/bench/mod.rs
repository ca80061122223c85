//! Benchmark driver for fixed-batch repeated inference.
//!
//! This module provides:
//! - Warm-up / measurement sequencing over a completion engine
//! - Latency and throughput series collection with HdrHistogram percentiles
//! - Report generation

pub mod metrics;
pub mod report;
pub mod runner;

pub use metrics::MetricsCollector;
pub use report::BenchmarkReport;
pub use runner::{prompt_batch, run_once, BenchmarkRunner, WARMUP_ITERATIONS};
