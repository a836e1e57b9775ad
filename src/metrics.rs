//! Metrics and observability for photo_inspect

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use serde::{Deserialize, Serialize};

/// Pipeline-wide counters, shared by every batch
#[derive(Default)]
pub struct Metrics {
    pub batches: AtomicU64,
    pub stale_batches: AtomicU64,
    pub files_processed: AtomicU64,
    pub files_failed: AtomicU64,
    pub total_latency_ms: AtomicU64,

    // Per-stage counters
    pub images_decoded: AtomicU64,
    pub thumbnails_created: AtomicU64,
    pub tag_extractions: AtomicU64,
    pub coordinates_resolved: AtomicU64,
    pub geocode_requests: AtomicU64,
    pub locations_resolved: AtomicU64,
}

/// Pipeline stages that bump a counter when they complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Resize,
    ExtractTags,
    ConvertCoordinates,
    GeocodeRequest,
    LocationFound,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_file(&self, success: bool, latency_ms: u64) {
        if success {
            self.files_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_stage(&self, stage: Stage) {
        let counter = match stage {
            Stage::Decode => &self.images_decoded,
            Stage::Resize => &self.thumbnails_created,
            Stage::ExtractTags => &self.tag_extractions,
            Stage::ConvertCoordinates => &self.coordinates_resolved,
            Stage::GeocodeRequest => &self.geocode_requests,
            Stage::LocationFound => &self.locations_resolved,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self, published: bool) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        if !published {
            self.stale_batches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let processed = self.files_processed.load(Ordering::Relaxed);
        let failed = self.files_failed.load(Ordering::Relaxed);
        let total = processed + failed;
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        MetricsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            stale_batches: self.stale_batches.load(Ordering::Relaxed),
            files_processed: processed,
            files_failed: failed,
            error_rate: if total > 0 { failed as f64 / total as f64 } else { 0.0 },
            avg_file_latency_ms: if total > 0 { total_latency / total } else { 0 },
            stages: StageMetrics {
                images_decoded: self.images_decoded.load(Ordering::Relaxed),
                thumbnails_created: self.thumbnails_created.load(Ordering::Relaxed),
                tag_extractions: self.tag_extractions.load(Ordering::Relaxed),
                coordinates_resolved: self.coordinates_resolved.load(Ordering::Relaxed),
                geocode_requests: self.geocode_requests.load(Ordering::Relaxed),
                locations_resolved: self.locations_resolved.load(Ordering::Relaxed),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub batches: u64,
    pub stale_batches: u64,
    pub files_processed: u64,
    pub files_failed: u64,
    pub error_rate: f64,
    pub avg_file_latency_ms: u64,
    pub stages: StageMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMetrics {
    pub images_decoded: u64,
    pub thumbnails_created: u64,
    pub tag_extractions: u64,
    pub coordinates_resolved: u64,
    pub geocode_requests: u64,
    pub locations_resolved: u64,
}

/// Timer for tracking per-file latency
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_rates() {
        let metrics = Metrics::new();
        metrics.record_file(true, 30);
        metrics.record_file(true, 10);
        metrics.record_file(false, 20);
        metrics.record_stage(Stage::Decode);
        metrics.record_stage(Stage::GeocodeRequest);
        metrics.record_batch(true);
        metrics.record_batch(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_processed, 2);
        assert_eq!(snapshot.files_failed, 1);
        assert!((snapshot.error_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(snapshot.avg_file_latency_ms, 20);
        assert_eq!(snapshot.stages.images_decoded, 1);
        assert_eq!(snapshot.stages.geocode_requests, 1);
        assert_eq!(snapshot.batches, 2);
        assert_eq!(snapshot.stale_batches, 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Metrics::default().snapshot();
        assert_eq!(snapshot.error_rate, 0.0);
        assert_eq!(snapshot.avg_file_latency_ms, 0);
    }
}
