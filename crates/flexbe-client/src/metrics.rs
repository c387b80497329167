//! Request metrics
//!
//! - `flexbe_requests_total` (counter): labels `method`, `status`
//! - `flexbe_request_duration_seconds` (histogram): label `method`
//! - `flexbe_request_errors_total` (counter): label `kind`
//!
//! The library only records. Installing an exporter is up to the binary.

use provider::ErrorKind;

/// Histogram name, exposed so binaries can configure buckets for it.
pub const REQUEST_DURATION: &str = "flexbe_request_duration_seconds";

/// Record a finished call. `status` is `None` when no response arrived.
pub fn record_request(method: &str, status: Option<u16>, duration_secs: f64) {
    let status = status.map_or_else(|| "none".to_string(), |s| s.to_string());
    metrics::counter!("flexbe_requests_total", "method" => method.to_string(), "status" => status)
        .increment(1);
    metrics::histogram!(REQUEST_DURATION, "method" => method.to_string()).record(duration_secs);
}

/// Record a failed call by its classified kind.
pub fn record_error(kind: ErrorKind) {
    metrics::counter!("flexbe_request_errors_total", "kind" => kind.label()).increment(1);
}
