//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog API calls (count and latency by outcome)
//! - Ingestion (courses persisted / skipped / failed, authors written)
//! - Local search (result sizes)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog API
// =============================================================================

/// Catalog API requests by result.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "coursedex_catalog_requests_total",
            "Total requests made to the external course catalog",
        ),
        &["result"], // "success", "error"
    )
    .unwrap()
});

/// Catalog API request duration in seconds.
pub static CATALOG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "coursedex_catalog_request_duration_seconds",
            "Duration of external course catalog requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Ingestion
// =============================================================================

/// Courses handled by ingestion, by outcome.
pub static COURSES_INGESTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "coursedex_courses_ingested_total",
            "Courses handled by ingestion",
        ),
        &["result"], // "persisted", "skipped", "failed"
    )
    .unwrap()
});

/// Author rows written.
pub static AUTHORS_PERSISTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "coursedex_authors_persisted_total",
        "Total author rows written",
    )
    .unwrap()
});

// =============================================================================
// Query
// =============================================================================

/// Courses returned per local search.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "coursedex_search_results",
            "Number of courses returned per local search",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0]),
        &[],
    )
    .unwrap()
});

/// All core metrics, for registration in the server registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CATALOG_REQUESTS.clone()),
        Box::new(CATALOG_REQUEST_DURATION.clone()),
        Box::new(COURSES_INGESTED.clone()),
        Box::new(AUTHORS_PERSISTED.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}
