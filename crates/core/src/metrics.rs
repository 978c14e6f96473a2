//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Engine (submissions, completions, failures, durations)
//! - Remote processing service (requests by operation and result)
//! - Previews (releases, double-release attempts)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Engine - Job Metrics
// =============================================================================

/// Jobs submitted total by variant.
pub static JOBS_SUBMITTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("androscaler_jobs_submitted_total", "Total jobs submitted"),
        &["variant"], // "upscale", "color"
    )
    .unwrap()
});

/// Jobs completed total by variant.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "androscaler_jobs_completed_total",
            "Total jobs that reached completed",
        ),
        &["variant"],
    )
    .unwrap()
});

/// Jobs failed total by variant and failing operation.
pub static JOBS_FAILED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "androscaler_jobs_failed_total",
            "Total jobs that ended in error",
        ),
        &["variant", "op"], // op: "upload", "upscale", "color_grade", "fix_metadata"
    )
    .unwrap()
});

/// Submissions dropped for not being images.
pub static FILES_REJECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "androscaler_files_rejected_total",
        "Total submitted files dropped for a non-image media type",
    )
    .unwrap()
});

/// Jobs that completed without a resolvable final URL.
pub static FINAL_URL_MISSING: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "androscaler_final_url_missing_total",
        "Total completed jobs with no viewable final URL",
    )
    .unwrap()
});

/// Job processing duration in seconds, submission to completion.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "androscaler_job_duration_seconds",
            "Wall-clock duration from submission to completion",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["variant"],
    )
    .unwrap()
});

// =============================================================================
// Remote Processing Service
// =============================================================================

/// Remote service requests total by operation and result.
pub static REMOTE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "androscaler_remote_requests_total",
            "Total remote processing service requests",
        ),
        &["op", "result"], // result: "success", "failed", "timeout"
    )
    .unwrap()
});

/// Remote service request duration in seconds by operation.
pub static REMOTE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "androscaler_remote_request_duration_seconds",
            "Duration of remote processing service requests",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 15.0, 30.0, 60.0, 300.0]),
        &["op"],
    )
    .unwrap()
});

// =============================================================================
// Previews
// =============================================================================

/// Preview handles released total.
pub static PREVIEWS_RELEASED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "androscaler_previews_released_total",
        "Total preview handles released",
    )
    .unwrap()
});

/// Register all metrics with a registry. Returns collectors in a fixed order.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Engine
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOBS_FAILED.clone()),
        Box::new(FILES_REJECTED.clone()),
        Box::new(FINAL_URL_MISSING.clone()),
        Box::new(JOB_DURATION.clone()),
        // Remote service
        Box::new(REMOTE_REQUESTS.clone()),
        Box::new(REMOTE_REQUEST_DURATION.clone()),
        // Previews
        Box::new(PREVIEWS_RELEASED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }

    #[test]
    fn test_counters_increment() {
        JOBS_SUBMITTED.with_label_values(&["upscale"]).inc();
        assert!(JOBS_SUBMITTED.with_label_values(&["upscale"]).get() >= 1);
    }
}
