// Metrics collection and tracking

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of recent latencies kept for percentile estimates
const LATENCY_WINDOW: usize = 1000;

/// Per-endpoint metrics
#[derive(Debug, Clone)]
pub struct EndpointMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
    pub total_latency_ms: Arc<AtomicU64>,
    pub min_latency_ms: Arc<AtomicU64>,
    pub max_latency_ms: Arc<AtomicU64>,
    latency_samples: Arc<Mutex<VecDeque<u64>>>,
}

impl EndpointMetrics {
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
            total_latency_ms: Arc::new(AtomicU64::new(0)),
            min_latency_ms: Arc::new(AtomicU64::new(u64::MAX)),
            max_latency_ms: Arc::new(AtomicU64::new(0)),
            latency_samples: Arc::new(Mutex::new(VecDeque::with_capacity(LATENCY_WINDOW))),
        }
    }

    pub fn record_request(&self, latency_ms: u64) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.min_latency_ms.fetch_min(latency_ms, Ordering::Relaxed);
        self.max_latency_ms.fetch_max(latency_ms, Ordering::Relaxed);

        if let Ok(mut samples) = self.latency_samples.lock() {
            if samples.len() == LATENCY_WINDOW {
                samples.pop_front();
            }
            samples.push_back(latency_ms);
        }
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_ms(&self) -> f64 {
        let count = self.request_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        total as f64 / count as f64
    }

    fn percentile(&self, p: u8) -> u64 {
        let Ok(samples) = self.latency_samples.lock() else {
            return 0;
        };
        if samples.is_empty() {
            return 0;
        }
        let mut sorted: Vec<u64> = samples.iter().copied().collect();
        sorted.sort_unstable();
        let index = (sorted.len() * p as usize / 100).min(sorted.len() - 1);
        sorted[index]
    }

    pub fn stats(&self) -> EndpointStats {
        let min = self.min_latency_ms.load(Ordering::Relaxed);
        EndpointStats {
            request_count: self.request_count.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            avg_latency_ms: self.avg_latency_ms(),
            min_latency_ms: if min == u64::MAX { 0 } else { min },
            max_latency_ms: self.max_latency_ms.load(Ordering::Relaxed),
            p50_latency_ms: self.percentile(50),
            p95_latency_ms: self.percentile(95),
        }
    }
}

impl Default for EndpointMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcomes of the analyze -> generate pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    pub analysis_sentinels: Arc<AtomicU64>,
    pub chunks_analyzed: Arc<AtomicU64>,
    pub images_generated: Arc<AtomicU64>,
    pub images_failed: Arc<AtomicU64>,
}

impl PipelineMetrics {
    pub fn record_sentinel(&self) {
        self.analysis_sentinels.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_images(&self, requested: usize, generated: usize) {
        self.chunks_analyzed.fetch_add(requested as u64, Ordering::Relaxed);
        self.images_generated.fetch_add(generated as u64, Ordering::Relaxed);
        self.images_failed
            .fetch_add(requested.saturating_sub(generated) as u64, Ordering::Relaxed);
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            analysis_sentinels: self.analysis_sentinels.load(Ordering::Relaxed),
            chunks_analyzed: self.chunks_analyzed.load(Ordering::Relaxed),
            images_generated: self.images_generated.load(Ordering::Relaxed),
            images_failed: self.images_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppMetrics {
    pub analyze: EndpointMetrics,
    pub pipeline: PipelineMetrics,
    started_at: Instant,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self {
            analyze: EndpointMetrics::new(),
            pipeline: PipelineMetrics::default(),
            started_at: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> MetricsResponse {
        MetricsResponse {
            timestamp: Utc::now(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            analyze: self.analyze.stats(),
            pipeline: self.pipeline.stats(),
        }
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub analyze: EndpointStats,
    pub pipeline: PipelineStats,
}

#[derive(Debug, Serialize)]
pub struct EndpointStats {
    pub request_count: u64,
    pub error_count: u64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub p50_latency_ms: u64,
    pub p95_latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct PipelineStats {
    pub analysis_sentinels: u64,
    pub chunks_analyzed: u64,
    pub images_generated: u64,
    pub images_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_stats() {
        let stats = EndpointMetrics::new().stats();
        assert_eq!(stats.request_count, 0);
        assert_eq!(stats.min_latency_ms, 0);
        assert_eq!(stats.p95_latency_ms, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
    }

    #[test]
    fn test_latency_stats() {
        let metrics = EndpointMetrics::new();
        for latency in [30, 10, 20, 40] {
            metrics.record_request(latency);
        }
        metrics.record_error();

        let stats = metrics.stats();
        assert_eq!(stats.request_count, 4);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.min_latency_ms, 10);
        assert_eq!(stats.max_latency_ms, 40);
        assert_eq!(stats.avg_latency_ms, 25.0);
        assert_eq!(stats.p50_latency_ms, 30);
        assert_eq!(stats.p95_latency_ms, 40);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let metrics = EndpointMetrics::new();
        for latency in 0..(LATENCY_WINDOW as u64 + 10) {
            metrics.record_request(latency);
        }
        assert_eq!(metrics.latency_samples.lock().unwrap().len(), LATENCY_WINDOW);
        assert_eq!(metrics.latency_samples.lock().unwrap().front(), Some(&10));
    }

    #[test]
    fn test_pipeline_counts_failed_images() {
        let metrics = PipelineMetrics::default();
        metrics.record_images(5, 3);
        metrics.record_sentinel();

        let stats = metrics.stats();
        assert_eq!(stats.chunks_analyzed, 5);
        assert_eq!(stats.images_generated, 3);
        assert_eq!(stats.images_failed, 2);
        assert_eq!(stats.analysis_sentinels, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = AppMetrics::new();
        let clone = metrics.clone();
        clone.analyze.record_request(5);
        assert_eq!(metrics.snapshot().analyze.request_count, 1);
    }
}
