//! Latency and throughput series with HdrHistogram percentiles.

use hdrhistogram::Histogram;

/// Per-run metrics: one latency and one derived throughput per measured
/// iteration, in iteration order.
pub struct MetricsCollector {
    /// Wall-clock latency of each measured batch call, in seconds
    latencies: Vec<f64>,
    /// Derived throughput of each call, in queries per second
    throughputs: Vec<f64>,
    /// Histogram of latencies in microseconds, for percentile reporting
    histogram: Histogram<u64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            latencies: Vec::new(),
            throughputs: Vec::new(),
            // Latencies up to 10 minutes with 3 significant figures
            histogram: Histogram::new_with_bounds(1, 600_000_000, 3).unwrap(),
        }
    }

    /// Record one measured iteration and return the derived throughput.
    ///
    /// Throughput is exactly `batch_size / latency`, appended elementwise so
    /// both series always have equal length.
    pub fn record(&mut self, latency_secs: f64, batch_size: usize) -> f64 {
        let throughput = batch_size as f64 / latency_secs;
        self.latencies.push(latency_secs);
        self.throughputs.push(throughput);

        let latency_us = (latency_secs * 1_000_000.0) as u64;
        let _ = self.histogram.record(latency_us.max(1));
        throughput
    }

    /// Number of measured iterations recorded so far
    pub fn len(&self) -> usize {
        self.latencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latencies.is_empty()
    }

    pub fn latencies(&self) -> &[f64] {
        &self.latencies
    }

    pub fn throughputs(&self) -> &[f64] {
        &self.throughputs
    }

    /// Arithmetic mean of the latency series in seconds
    pub fn mean_latency(&self) -> f64 {
        mean(&self.latencies)
    }

    /// Arithmetic mean of the throughput series in queries per second
    pub fn mean_throughput(&self) -> f64 {
        mean(&self.throughputs)
    }

    /// Latency percentile in seconds
    pub fn latency_percentile(&self, percentile: f64) -> f64 {
        self.histogram.value_at_percentile(percentile) as f64 / 1_000_000.0
    }

    /// Smallest recorded latency in seconds
    pub fn min_latency(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        self.latencies.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest recorded latency in seconds
    pub fn max_latency(&self) -> f64 {
        self.latencies.iter().copied().fold(0.0, f64::max)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_latency_series() {
        // Two iterations at 2.0s with a batch of 4 -> QPS 2.0 each.
        let mut collector = MetricsCollector::new();
        collector.record(2.0, 4);
        collector.record(2.0, 4);

        assert_eq!(collector.latencies(), &[2.0, 2.0]);
        assert_eq!(collector.throughputs(), &[2.0, 2.0]);
        assert_eq!(format!("{:.3}", collector.mean_latency()), "2.000");
        assert_eq!(format!("{:.3}", collector.mean_throughput()), "2.000");
    }

    #[test]
    fn test_series_lengths_match() {
        let mut collector = MetricsCollector::new();
        for i in 1..=10 {
            collector.record(i as f64 / 10.0, 32);
        }
        assert_eq!(collector.len(), 10);
        assert_eq!(collector.latencies().len(), collector.throughputs().len());
    }

    #[test]
    fn test_empty_collector() {
        let collector = MetricsCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.mean_latency(), 0.0);
        assert_eq!(collector.mean_throughput(), 0.0);
    }

    #[test]
    fn test_percentiles_and_extremes() {
        let mut collector = MetricsCollector::new();
        collector.record(0.100, 8);
        collector.record(0.200, 8);
        collector.record(0.300, 8);

        assert!((collector.min_latency() - 0.100).abs() < 1e-9);
        assert!((collector.max_latency() - 0.300).abs() < 1e-9);
        // HdrHistogram keeps 3 significant figures
        let p50 = collector.latency_percentile(50.0);
        assert!((p50 - 0.200).abs() < 0.001, "p50 was {p50}");
    }

    #[test]
    fn test_record_returns_throughput() {
        let mut collector = MetricsCollector::new();
        let qps = collector.record(0.5, 16);
        assert_eq!(qps, 32.0);
        assert_eq!(collector.throughputs(), &[32.0]);
    }

    proptest! {
        // throughput[i] is exactly batch_size / latency[i], elementwise
        #[test]
        fn prop_throughput_derivation(
            latencies in proptest::collection::vec(0.001f64..10.0, 1..50),
            batch_size in 1usize..64,
        ) {
            let mut collector = MetricsCollector::new();
            for &latency in &latencies {
                collector.record(latency, batch_size);
            }

            prop_assert_eq!(collector.len(), latencies.len());
            for (latency, throughput) in
                collector.latencies().iter().zip(collector.throughputs())
            {
                prop_assert_eq!(*throughput, batch_size as f64 / *latency);
            }
        }

        // The mean is the exact arithmetic mean of the series
        #[test]
        fn prop_mean_latency(
            latencies in proptest::collection::vec(0.001f64..10.0, 1..50),
        ) {
            let mut collector = MetricsCollector::new();
            for &latency in &latencies {
                collector.record(latency, 1);
            }
            let expected = latencies.iter().sum::<f64>() / latencies.len() as f64;
            prop_assert!((collector.mean_latency() - expected).abs() < 1e-12);
        }
    }
}
