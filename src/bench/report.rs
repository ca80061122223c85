//! Report generation for benchmark results.

use serde::{Deserialize, Serialize};

use super::metrics::MetricsCollector;

/// Run-level aggregates derived from the measured series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Number of measured iterations
    pub iterations: usize,
    /// Prompts per batch call
    pub batch_size: usize,
    /// Arithmetic mean of the latency series, seconds
    pub avg_latency_secs: f64,
    /// Arithmetic mean of the throughput series, queries per second
    pub avg_throughput_qps: f64,
    pub latency_p50_secs: f64,
    pub latency_p95_secs: f64,
    pub latency_p99_secs: f64,
    pub min_latency_secs: f64,
    pub max_latency_secs: f64,
}

impl BenchmarkReport {
    /// Aggregate a finished run
    pub fn from_metrics(metrics: &MetricsCollector, batch_size: usize) -> Self {
        Self {
            iterations: metrics.len(),
            batch_size,
            avg_latency_secs: metrics.mean_latency(),
            avg_throughput_qps: metrics.mean_throughput(),
            latency_p50_secs: metrics.latency_percentile(50.0),
            latency_p95_secs: metrics.latency_percentile(95.0),
            latency_p99_secs: metrics.latency_percentile(99.0),
            min_latency_secs: metrics.min_latency(),
            max_latency_secs: metrics.max_latency(),
        }
    }

    /// Print the run-level averages
    pub fn print_summary(&self) {
        println!(
            "Average latency: {:.3}s, average QPS: {:.3}",
            self.avg_latency_secs, self.avg_throughput_qps
        );
    }

    /// Export the report as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(latencies: &[f64], batch_size: usize) -> MetricsCollector {
        let mut metrics = MetricsCollector::new();
        for &latency in latencies {
            metrics.record(latency, batch_size);
        }
        metrics
    }

    #[test]
    fn test_report_averages() {
        let metrics = collector(&[2.0, 2.0], 4);
        let report = BenchmarkReport::from_metrics(&metrics, 4);

        assert_eq!(report.iterations, 2);
        assert_eq!(report.batch_size, 4);
        assert_eq!(format!("{:.3}", report.avg_latency_secs), "2.000");
        assert_eq!(format!("{:.3}", report.avg_throughput_qps), "2.000");
    }

    #[test]
    fn test_report_extremes() {
        let metrics = collector(&[0.1, 0.4, 0.2], 8);
        let report = BenchmarkReport::from_metrics(&metrics, 8);

        assert!((report.min_latency_secs - 0.1).abs() < 1e-9);
        assert!((report.max_latency_secs - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let metrics = collector(&[1.5, 2.5], 32);
        let report = BenchmarkReport::from_metrics(&metrics, 32);

        let json = report.to_json();
        let back: BenchmarkReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.iterations, 2);
        assert_eq!(back.batch_size, 32);
        assert!((back.avg_latency_secs - 2.0).abs() < 1e-9);
    }
}
