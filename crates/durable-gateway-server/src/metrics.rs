//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use durable_gateway_core::GatewayError;

/// Request counters for the trigger service.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    started: AtomicU64,
    invalid_argument: AtomicU64,
    failed_precondition: AtomicU64,
    unavailable: AtomicU64,
    not_found: AtomicU64,
    internal: AtomicU64,
    cancelled: AtomicU64,
}

impl GatewayMetrics {
    /// Count a successfully started instance.
    pub fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed StartNew by its status code.
    pub fn record_failure(&self, err: &GatewayError) {
        let counter = match err {
            GatewayError::InvalidArgument(_) => &self.invalid_argument,
            GatewayError::Resolution(_) => &self.failed_precondition,
            GatewayError::Unavailable(_) => &self.unavailable,
            GatewayError::NotFound(_) => &self.not_found,
            GatewayError::Internal(_) => &self.internal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a StartNew dropped before completion.
    pub fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of instances started so far.
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Total failed StartNew calls.
    pub fn failed(&self) -> u64 {
        self.failures().iter().map(|(_, n)| n).sum()
    }

    /// StartNew calls dropped by deadline expiry or caller disconnect.
    pub fn cancelled(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn failures(&self) -> [(&'static str, u64); 5] {
        [
            ("invalid_argument", self.invalid_argument.load(Ordering::Relaxed)),
            ("failed_precondition", self.failed_precondition.load(Ordering::Relaxed)),
            ("unavailable", self.unavailable.load(Ordering::Relaxed)),
            ("not_found", self.not_found.load(Ordering::Relaxed)),
            ("internal", self.internal.load(Ordering::Relaxed)),
        ]
    }

    /// Format all counters as Prometheus text.
    pub fn render(&self) -> String {
        let mut output = String::new();

        writeln!(
            output,
            "# HELP durable_gateway_instances_started_total Orchestration instances started through the gateway"
        )
        .ok();
        writeln!(output, "# TYPE durable_gateway_instances_started_total counter").ok();
        writeln!(
            output,
            "durable_gateway_instances_started_total {}",
            self.started()
        )
        .ok();

        writeln!(
            output,
            "# HELP durable_gateway_start_failures_total Failed StartNew requests by status code"
        )
        .ok();
        writeln!(output, "# TYPE durable_gateway_start_failures_total counter").ok();
        for (code, count) in self.failures() {
            writeln!(
                output,
                "durable_gateway_start_failures_total{{code=\"{code}\"}} {count}"
            )
            .ok();
        }

        writeln!(
            output,
            "# HELP durable_gateway_start_cancelled_total StartNew requests dropped before completion"
        )
        .ok();
        writeln!(output, "# TYPE durable_gateway_start_cancelled_total counter").ok();
        writeln!(
            output,
            "durable_gateway_start_cancelled_total {}",
            self.cancelled()
        )
        .ok();

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_counts() {
        let metrics = GatewayMetrics::default();
        metrics.record_started();
        metrics.record_started();
        metrics.record_failure(&GatewayError::Unavailable("down".into()));
        metrics.record_cancelled();

        let output = metrics.render();
        assert!(output.contains("durable_gateway_instances_started_total 2"));
        assert!(output.contains("durable_gateway_start_failures_total{code=\"unavailable\"} 1"));
        assert!(output.contains("durable_gateway_start_failures_total{code=\"not_found\"} 0"));
        assert!(output.contains("durable_gateway_start_cancelled_total 1"));
        assert_eq!(metrics.failed(), 1);
    }
}
