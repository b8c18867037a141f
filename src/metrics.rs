//! Per-provider request metrics
//!
//! Tracks a rolling latency window and success rate for each configured
//! provider, so operators can see which source the rotation is actually
//! leaning on.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples kept in the rolling window
const MAX_SAMPLES: usize = 100;

/// Snapshot of one provider's request metrics
#[derive(Debug, Clone)]
pub struct ProviderMetrics {
    /// Name of the provider
    pub provider_name: String,
    /// 50th percentile latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of requests tracked
    pub total_requests: u64,
    /// Number of failed requests
    pub failed_requests: u64,
}

impl ProviderMetrics {
    /// Metrics for a provider that has not been called yet
    pub fn empty(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

#[derive(Default)]
struct MetricsInner {
    samples: VecDeque<LatencySample>,
    total_requests: u64,
    failed_requests: u64,
}

/// Collects request outcomes for a single provider
pub struct MetricsCollector {
    provider_name: String,
    inner: RwLock<MetricsInner>,
}

impl MetricsCollector {
    /// Creates a collector for the named provider
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            inner: RwLock::new(MetricsInner::default()),
        }
    }

    /// Records one request with its duration and outcome
    pub async fn record_request(&self, duration: Duration, success: bool) {
        let mut inner = self.inner.write().await;

        inner.total_requests += 1;
        if !success {
            inner.failed_requests += 1;
        }

        if inner.samples.len() >= MAX_SAMPLES {
            inner.samples.pop_front();
        }
        inner.samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success,
        });
    }

    /// Computes current metrics from the collected samples
    pub async fn get_metrics(&self) -> ProviderMetrics {
        let inner = self.inner.read().await;

        if inner.samples.is_empty() {
            return ProviderMetrics::empty(&self.provider_name);
        }

        // percentiles come from successful samples only
        let mut latencies: Vec<f64> = inner
            .samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if inner.total_requests > 0 {
            (inner.total_requests - inner.failed_requests) as f64 / inner.total_requests as f64
        } else {
            1.0
        };

        ProviderMetrics {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: inner.total_requests,
            failed_requests: inner.failed_requests,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
