//! Metric emission tests.
//!
//! Each test installs a thread-local debugging recorder, so tests never share
//! the global recorder.

mod common;

use common::{board, factory_with, fleet_with, path, Board};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use otctl_metrics::metric_defs;

/// Values captured from one snapshot, one entry per metric and label set.
#[derive(Debug, Default)]
struct Recorded {
    counters: Vec<(String, Vec<(String, String)>, u64)>,
    gauges: Vec<(String, f64)>,
    histograms: Vec<(String, usize)>,
}

impl Recorded {
    fn take(snapshotter: &Snapshotter) -> Self {
        let mut recorded = Recorded::default();
        for (key, _, _, value) in snapshotter.snapshot().into_vec() {
            let name = key.key().name().to_string();
            match value {
                DebugValue::Counter(n) => {
                    let labels = key
                        .key()
                        .labels()
                        .map(|l| (l.key().to_string(), l.value().to_string()))
                        .collect();
                    recorded.counters.push((name, labels, n));
                }
                DebugValue::Gauge(v) => recorded.gauges.push((name, v.0)),
                DebugValue::Histogram(samples) => recorded.histograms.push((name, samples.len())),
            }
        }
        recorded
    }

    fn counter(&self, name: &str) -> u64 {
        self.counters
            .iter()
            .filter(|(n, _, _)| n == name)
            .map(|(_, _, v)| v)
            .sum()
    }

    fn counter_with(&self, name: &str, label: (&str, &str)) -> u64 {
        self.counters
            .iter()
            .filter(|(n, labels, _)| {
                n == name && labels.iter().any(|(k, v)| k == label.0 && v == label.1)
            })
            .map(|(_, _, v)| v)
            .sum()
    }

    fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    fn histogram_samples(&self, name: &str) -> usize {
        self.histograms
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, count)| count)
            .sum()
    }
}

#[test]
fn test_discovery_and_broadcast_emit_metrics() {
    let factory = factory_with(&[(1, Board::Zephyr), (2, Board::Efr32)]);
    // Write 1 is the platform probe; the broadcast write times out.
    factory.add_device(&path(3), board(Board::Zephyr).fail_on_write(2));

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let mut fleet = fleet_with(&factory);
        assert_eq!(fleet.discover(), 3);

        let report = fleet.broadcast("bogus").unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failed.len(), 1);
    });

    let recorded = Recorded::take(&snapshotter);
    assert_eq!(recorded.counter(metric_defs::PROBE_ATTEMPTS.name), 3);
    assert_eq!(recorded.gauge(metric_defs::DEVICES_FOUND.name), Some(3.0));
    assert_eq!(recorded.counter(metric_defs::COMMANDS_SENT.name), 2);
    // Both delivered replies reject the unknown command.
    assert_eq!(recorded.counter(metric_defs::COMMANDS_FAILED.name), 2);
    assert_eq!(recorded.counter(metric_defs::TRANSPORT_ERRORS.name), 1);
    assert_eq!(
        recorded.counter_with(metric_defs::TRANSPORT_ERRORS.name, ("kind", "write_timeout")),
        1
    );
    let failing = path(3);
    assert_eq!(
        recorded.counter_with(metric_defs::TRANSPORT_ERRORS.name, ("device", failing.as_str())),
        1
    );
    assert_eq!(recorded.histogram_samples(metric_defs::SEQUENCE_DURATION.name), 3);
}

#[test]
fn test_checked_steps_and_rejected_commands_are_counted() {
    let factory = factory_with(&[(1, Board::Zephyr)]);

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let mut fleet = fleet_with(&factory);
        assert_eq!(fleet.discover(), 1);
        // With the interface down, `thread start` is refused.
        assert!(fleet.stop_all().all_succeeded());
        let report = fleet.broadcast("ot thread start").unwrap();
        assert_eq!(report.outcomes.len(), 1);
    });

    let recorded = Recorded::take(&snapshotter);
    // thread stop, ifconfig down, thread start.
    assert_eq!(recorded.counter(metric_defs::COMMANDS_SENT.name), 3);
    assert_eq!(recorded.counter(metric_defs::COMMANDS_FAILED.name), 1);
    assert_eq!(recorded.counter(metric_defs::TRANSPORT_ERRORS.name), 0);
}
