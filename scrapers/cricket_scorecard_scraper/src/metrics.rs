use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

/// Usage counters for the extraction shell. Lives in the shell's state, never in the
/// extraction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub total_extractions: u64,
    pub successful_extractions: u64,
    pub failed_extractions: u64,
    pub cache_hits: u64,
    pub avg_extraction_time_ms: f64,
    pub last_error: Option<String>,
    pub last_error_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<UsageMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_extraction_start(&self) -> ExtractionTracker {
        ExtractionTracker {
            start_time: Instant::now(),
            collector: self.clone(),
        }
    }

    /// A cached outcome was served; counts as an extraction without timing it.
    pub fn record_cache_hit(&self, success: bool) {
        let mut metrics = self.lock();
        metrics.cache_hits += 1;
        metrics.total_extractions += 1;
        if success {
            metrics.successful_extractions += 1;
        } else {
            metrics.failed_extractions += 1;
        }
    }

    pub fn record_error(&self, error: String) {
        let mut metrics = self.lock();
        metrics.last_error = Some(error);
        metrics.last_error_time = Some(Utc::now());
    }

    pub fn get_metrics(&self) -> UsageMetrics {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UsageMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct ExtractionTracker {
    start_time: Instant,
    collector: MetricsCollector,
}

impl ExtractionTracker {
    pub fn finish(self, success: bool) {
        let duration = self.start_time.elapsed();
        let mut metrics = self.collector.lock();

        metrics.total_extractions += 1;
        if success {
            metrics.successful_extractions += 1;
        } else {
            metrics.failed_extractions += 1;
        }

        // Exponential moving average
        let alpha = 0.1;
        metrics.avg_extraction_time_ms =
            metrics.avg_extraction_time_ms * (1.0 - alpha) + duration.as_secs_f64() * 1000.0 * alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_metrics_collector_basic() {
        let collector = MetricsCollector::new();
        let tracker = collector.record_extraction_start();

        std::thread::sleep(Duration::from_millis(5));

        tracker.finish(true);
        let metrics = collector.get_metrics();

        assert_eq!(metrics.total_extractions, 1);
        assert_eq!(metrics.successful_extractions, 1);
        assert_eq!(metrics.failed_extractions, 0);
        assert!(metrics.avg_extraction_time_ms > 0.0);
    }

    #[test]
    fn test_metrics_collector_failed_extraction() {
        let collector = MetricsCollector::new();
        collector.record_extraction_start().finish(false);
        collector.record_error("Could not detect two distinct teams".to_string());

        let metrics = collector.get_metrics();
        assert_eq!(metrics.total_extractions, 1);
        assert_eq!(metrics.failed_extractions, 1);
        assert_eq!(
            metrics.last_error.as_deref(),
            Some("Could not detect two distinct teams")
        );
        assert!(metrics.last_error_time.is_some());
    }

    #[test]
    fn test_metrics_collector_cache_hits() {
        let collector = MetricsCollector::new();
        collector.record_cache_hit(true);
        collector.record_cache_hit(false);

        let metrics = collector.get_metrics();
        assert_eq!(metrics.cache_hits, 2);
        assert_eq!(metrics.total_extractions, 2);
        assert_eq!(metrics.successful_extractions, 1);
        assert_eq!(metrics.failed_extractions, 1);
        assert_eq!(metrics.avg_extraction_time_ms, 0.0);
    }

    #[test]
    fn test_metrics_shared_between_clones() {
        let collector = MetricsCollector::new();
        let handle = collector.clone();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let handle = handle.clone();
                std::thread::spawn(move || handle.record_extraction_start().finish(i % 2 == 0))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let metrics = collector.get_metrics();
        assert_eq!(metrics.total_extractions, 4);
        assert_eq!(metrics.successful_extractions, 2);
    }
}
