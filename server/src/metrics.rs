// Metrics collection and tracking

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

const LATENCY_WINDOW: usize = 1000;

/// Per-endpoint request counters and a sliding window of latencies
#[derive(Debug, Clone)]
pub struct EndpointMetrics {
    request_count: Arc<AtomicU64>,
    error_count: Arc<AtomicU64>,
    total_latency_ms: Arc<AtomicU64>,
    min_latency_ms: Arc<AtomicU64>,
    max_latency_ms: Arc<AtomicU64>,
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

    pub fn snapshot(&self) -> EndpointStats {
        let request_count = self.request_count.load(Ordering::Relaxed);
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let min = self.min_latency_ms.load(Ordering::Relaxed);

        EndpointStats {
            request_count,
            error_count: self.error_count.load(Ordering::Relaxed),
            avg_latency_ms: if request_count == 0 {
                0.0
            } else {
                total as f64 / request_count as f64
            },
            min_latency_ms: if min == u64::MAX { 0 } else { min },
            max_latency_ms: self.max_latency_ms.load(Ordering::Relaxed),
            p50_latency_ms: self.percentile(50),
            p95_latency_ms: self.percentile(95),
            p99_latency_ms: self.percentile(99),
        }
    }
}

impl Default for EndpointMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome counters for audio generation
#[derive(Debug, Clone, Default)]
pub struct GenerationMetrics {
    wrapped: Arc<AtomicU64>,
    passed_through: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
    total_audio_bytes: Arc<AtomicU64>,
}

impl GenerationMetrics {
    pub fn record_success(&self, wrapped: bool, audio_bytes: usize) {
        if wrapped {
            self.wrapped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.passed_through.fetch_add(1, Ordering::Relaxed);
        }
        self.total_audio_bytes
            .fetch_add(audio_bytes as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> GenerationStats {
        GenerationStats {
            wrapped: self.wrapped.load(Ordering::Relaxed),
            passed_through: self.passed_through.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            total_audio_bytes: self.total_audio_bytes.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppMetrics {
    pub generate_audio: EndpointMetrics,
    pub generation: GenerationMetrics,
    started_at: Instant,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self {
            generate_audio: EndpointMetrics::new(),
            generation: GenerationMetrics::default(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub generate_audio: EndpointStats,
    pub generation: GenerationStats,
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
    pub p99_latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct GenerationStats {
    pub wrapped: u64,
    pub passed_through: u64,
    pub failures: u64,
    pub total_audio_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_snapshot() {
        let stats = EndpointMetrics::new().snapshot();
        assert_eq!(stats.request_count, 0);
        assert_eq!(stats.min_latency_ms, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
        assert_eq!(stats.p99_latency_ms, 0);
    }

    #[test]
    fn test_latency_stats() {
        let m = EndpointMetrics::new();
        for latency in [10, 20, 30, 40] {
            m.record_request(latency);
        }
        m.record_error();

        let stats = m.snapshot();
        assert_eq!(stats.request_count, 4);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.min_latency_ms, 10);
        assert_eq!(stats.max_latency_ms, 40);
        assert_eq!(stats.avg_latency_ms, 25.0);
        assert_eq!(stats.p50_latency_ms, 30);
        assert_eq!(stats.p99_latency_ms, 40);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let m = EndpointMetrics::new();
        for latency in 0..(LATENCY_WINDOW as u64 + 10) {
            m.record_request(latency);
        }
        assert_eq!(m.latency_samples.lock().unwrap().len(), LATENCY_WINDOW);
        assert_eq!(m.latency_samples.lock().unwrap().front(), Some(&10));
    }

    #[test]
    fn test_generation_counters() {
        let g = GenerationMetrics::default();
        g.record_success(true, 100);
        g.record_success(false, 50);
        g.record_failure();

        let stats = g.snapshot();
        assert_eq!(stats.wrapped, 1);
        assert_eq!(stats.passed_through, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.total_audio_bytes, 150);
    }
}
