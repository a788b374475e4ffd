// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the search adapter.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application chooses the exporter.
//!
//! # Metric Naming Convention
//! - `search_adapter_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: create, read_many, read_one, update, delete, commit
//! - `status`: success, error
//! - `outcome`: indexed, rejected

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a finished adapter operation
pub fn record_operation(operation: &str, status: &str) {
    counter!(
        "search_adapter_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record operation latency (connection acquire to release)
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "search_adapter_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record the total hit count reported for a query
pub fn record_hits(operation: &str, total: u64) {
    histogram!(
        "search_adapter_query_hits",
        "operation" => operation.to_string()
    )
    .record(total as f64);
}

/// Record per-document write outcomes
pub fn record_write_outcomes(indexed: usize, rejected: usize) {
    counter!("search_adapter_documents_total", "outcome" => "indexed").increment(indexed as u64);
    counter!("search_adapter_documents_total", "outcome" => "rejected").increment(rejected as u64);
}

/// Record a failure to acquire a connection
pub fn record_connection_error(operation: &str) {
    counter!(
        "search_adapter_connection_errors_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// RAII timer; records into `search_adapter_operation_seconds` on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}
