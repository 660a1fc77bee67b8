//! Metrics and observability utilities
//!
//! Prometheus metrics for the API, the museum fan-out and the harvester.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Art Stuff metrics
pub const METRICS_PREFIX: &str = "artstuff";

/// Histogram buckets for API request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.00,
];

/// Buckets for museum API calls, which are slow and spiky
pub const MUSEUM_BUCKETS: &[f64] = &[
    0.100, 0.250, 0.500, 1.000, 2.000, 5.000, 10.00, 20.00,
];

/// Histogram names paired with their bucket layout
pub fn histogram_buckets() -> Vec<(String, &'static [f64])> {
    vec![
        (format!("{}_request_duration_seconds", METRICS_PREFIX), LATENCY_BUCKETS),
        (format!("{}_search_duration_seconds", METRICS_PREFIX), LATENCY_BUCKETS),
        (format!("{}_museum_request_duration_seconds", METRICS_PREFIX), MUSEUM_BUCKETS),
    ]
}

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Search metrics
    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of search queries"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Search query latency in seconds"
    );

    describe_gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of results returned from the last search"
    );

    describe_counter!(
        format!("{}_search_suggestions_total", METRICS_PREFIX),
        Unit::Count,
        "Searches answered with a spelling suggestion"
    );

    // Museum API metrics
    describe_counter!(
        format!("{}_museum_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total museum API requests"
    );

    describe_histogram!(
        format!("{}_museum_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Museum API latency in seconds"
    );

    describe_counter!(
        format!("{}_museum_source_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Museum sources skipped during a fan-out search"
    );

    // Harvest metrics
    describe_counter!(
        format!("{}_paintings_harvested_total", METRICS_PREFIX),
        Unit::Count,
        "Total paintings upserted by the harvester"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, mode: &str, result_count: usize, suggested: bool) {
    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .set(result_count as f64);

    if suggested {
        counter!(format!("{}_search_suggestions_total", METRICS_PREFIX)).increment(1);
    }
}

/// Helper to record a single museum API call
pub fn record_museum_request(museum: &str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_museum_requests_total", METRICS_PREFIX),
        "museum" => museum.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        format!("{}_museum_request_duration_seconds", METRICS_PREFIX),
        "museum" => museum.to_string()
    )
    .record(duration_secs);
}

/// A museum dropped out of a fan-out search
pub fn record_source_failure(museum: &str) {
    counter!(
        format!("{}_museum_source_failures_total", METRICS_PREFIX),
        "museum" => museum.to_string()
    )
    .increment(1);
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}

/// Helper to record harvest progress
pub fn record_harvest(museum: &str, paintings: usize) {
    counter!(
        format!("{}_paintings_harvested_total", METRICS_PREFIX),
        "museum" => museum.to_string()
    )
    .increment(paintings as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_sorted() {
        for buckets in [LATENCY_BUCKETS, MUSEUM_BUCKETS] {
            let mut prev = 0.0;
            for &bucket in buckets {
                assert!(bucket > prev);
                prev = bucket;
            }
        }
    }

    #[test]
    fn test_museum_histogram_uses_museum_buckets() {
        let buckets = histogram_buckets();
        let bucket_for = |name: &str| {
            buckets
                .iter()
                .find(|(n, _)| n == &format!("{}_{}", METRICS_PREFIX, name))
                .map(|(_, b)| *b)
        };

        assert_eq!(bucket_for("museum_request_duration_seconds"), Some(MUSEUM_BUCKETS));
        assert_eq!(bucket_for("search_duration_seconds"), Some(LATENCY_BUCKETS));
        assert_eq!(bucket_for("request_duration_seconds"), Some(LATENCY_BUCKETS));
    }

    #[test]
    fn test_recorders_without_exporter() {
        let metrics = RequestMetrics::start("GET", "/api/search");
        metrics.finish(200);
        record_search(0.12, "live", 3, false);
        record_museum_request("aic", 0.4, true);
        record_source_failure("met");
        record_cache(true, "museum");
        record_harvest("smk", 20);
    }
}
