//! Metrics infrastructure for OpenThread fleet control.
//!
//! This crate declares every metric recorded by the fleet as a structured
//! [`Metric`] constant and provides label helpers. It re-exports the `metrics`
//! crate.
//!
//! The fleet only emits; it never installs a recorder. Values go to whatever
//! recorder the host process installs (globally or with
//! `metrics::with_local_recorder`). The `otctl` binary installs none, so there
//! every recording call is a no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use otctl_metrics::{metric_defs, describe_metrics, DeviceLabels};
//!
//! describe_metrics();
//!
//! let labels = DeviceLabels::new("/dev/ttyACM1", "zephyr-nrf");
//! metrics::counter!(metric_defs::COMMANDS_SENT.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use otctl_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const PROBES: Metric = Metric::counter("otctl.probe.attempts")
///     .with_description("Probe attempts")
///     .with_unit(Unit::Count)
///     .with_labels(&["device"]);
///
/// assert_eq!(PROBES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "otctl.commands.sent").
    pub name: &'static str,
    /// The kind of metric (counter, gauge, histogram).
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for fleet control.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Labels present on all device-scoped metrics.
    pub const DEVICE_LABELS: &[&str] = &["device", "platform"];

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Candidate paths that existed and were probed.
    pub const PROBE_ATTEMPTS: Metric = Metric::counter("otctl.probe.attempts")
        .with_description("Candidate device paths probed")
        .with_unit(Unit::Count)
        .with_labels(&["device"]);

    /// Devices recognized by the last discovery pass.
    pub const DEVICES_FOUND: Metric = Metric::gauge("otctl.probe.devices_found")
        .with_description("Devices recognized by the last discovery pass")
        .with_unit(Unit::Count);

    // ========================================================================
    // Commands
    // ========================================================================

    /// Commands written to a device.
    ///
    /// Labels: device, platform
    pub const COMMANDS_SENT: Metric = Metric::counter("otctl.commands.sent")
        .with_description("CLI commands written to devices")
        .with_unit(Unit::Count)
        .with_labels(DEVICE_LABELS);

    /// Checked commands whose reply lacked the completion marker.
    ///
    /// Labels: device, platform
    pub const COMMANDS_FAILED: Metric = Metric::counter("otctl.commands.failed")
        .with_description("CLI commands not acknowledged with Done")
        .with_unit(Unit::Count)
        .with_labels(DEVICE_LABELS);

    /// Transport errors, by kind.
    ///
    /// Labels: device, kind
    pub const TRANSPORT_ERRORS: Metric = Metric::counter("otctl.transport.errors")
        .with_description("Serial transport errors")
        .with_unit(Unit::Count)
        .with_labels(&["device", "kind"]);

    /// Wall-clock duration of one command sequence.
    ///
    /// Labels: device, platform
    pub const SEQUENCE_DURATION: Metric = Metric::histogram("otctl.sequence.duration_ms")
        .with_description("Duration of one configuration command sequence")
        .with_unit(Unit::Milliseconds)
        .with_labels(DEVICE_LABELS);

    /// All metrics, for registration.
    pub const ALL: &[&Metric] = &[
        &PROBE_ATTEMPTS,
        &DEVICES_FOUND,
        &COMMANDS_SENT,
        &COMMANDS_FAILED,
        &TRANSPORT_ERRORS,
        &SEQUENCE_DURATION,
    ];
}

/// Labels identifying one device.
#[derive(Debug, Clone)]
pub struct DeviceLabels {
    /// Device path.
    pub device: String,
    /// Platform family name.
    pub platform: String,
}

impl DeviceLabels {
    /// Creates labels for a device.
    pub fn new(device: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            platform: platform.into(),
        }
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("device", self.device.clone()),
            ("platform", self.platform.clone()),
        ]
    }
}

/// Describes all metrics. Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_labels() {
        let labels = DeviceLabels::new("/dev/ttyACM1", "efr32");
        let label_vec = labels.to_labels();

        assert_eq!(label_vec.len(), 2);
        assert!(label_vec.contains(&("device", "/dev/ttyACM1".to_string())));
        assert!(label_vec.contains(&("platform", "efr32".to_string())));
    }

    #[test]
    fn test_metric_definitions() {
        assert_eq!(metric_defs::COMMANDS_SENT.name, "otctl.commands.sent");
        assert_eq!(metric_defs::COMMANDS_SENT.labels, metric_defs::DEVICE_LABELS);
        assert_eq!(metric_defs::DEVICES_FOUND.kind, MetricKind::Gauge);
        assert_eq!(metric_defs::SEQUENCE_DURATION.kind, MetricKind::Histogram);
        assert_eq!(metric_defs::SEQUENCE_DURATION.unit, Some(Unit::Milliseconds));
        assert_eq!(metric_defs::ALL.len(), 6);
    }

    #[test]
    fn test_metric_minimal() {
        const MINIMAL: Metric = Metric::counter("minimal");

        assert_eq!(MINIMAL.name, "minimal");
        assert_eq!(MINIMAL.kind, MetricKind::Counter);
        assert_eq!(MINIMAL.description, "");
        assert_eq!(MINIMAL.unit, None);
        assert_eq!(MINIMAL.labels, &[] as &[&str]);
    }

    #[test]
    fn test_describe_without_recorder_is_noop() {
        describe_metrics();
    }
}
