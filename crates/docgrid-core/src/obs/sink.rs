//! Metrics sink boundary.
//!
//! Snapshot logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between snapshot construction
//! and the thread-local metrics state.
use crate::{association::ShapeKind, obs::metrics};
use derive_more::Display;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// RejectReason
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum RejectReason {
    #[display("duplicate_row_key")]
    DuplicateRowKey,

    #[display("malformed_association")]
    MalformedAssociation,

    #[display("malformed_row_record")]
    MalformedRowRecord,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    SnapshotBuilt {
        table: &'a str,
        shape: ShapeKind,
        rows: u64,
    },
    SnapshotRejected {
        table: &'a str,
        reason: RejectReason,
    },
    /// A later row replaced an earlier row with the same key.
    DuplicateRowKey { table: &'a str },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::SnapshotBuilt { table, shape, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.snapshots_built = m.ops.snapshots_built.saturating_add(1);
                    m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows);
                    match shape {
                        ShapeKind::Embedded => {
                            m.ops.embedded_builds = m.ops.embedded_builds.saturating_add(1);
                        }
                        ShapeKind::Referenced => {
                            m.ops.referenced_builds = m.ops.referenced_builds.saturating_add(1);
                        }
                    }

                    let entry = metrics::table_entry(m, table);
                    entry.snapshots_built = entry.snapshots_built.saturating_add(1);
                    entry.rows_loaded = entry.rows_loaded.saturating_add(rows);
                });
            }

            MetricsEvent::SnapshotRejected { table, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.builds_rejected = m.ops.builds_rejected.saturating_add(1);
                    let entry = metrics::table_entry(m, table);
                    entry.builds_rejected = entry.builds_rejected.saturating_add(1);
                });
            }

            MetricsEvent::DuplicateRowKey { table } => {
                metrics::with_state_mut(|m| {
                    m.ops.duplicate_rows_overwritten =
                        m.ops.duplicate_rows_overwritten.saturating_add(1);
                    let entry = metrics::table_entry(m, table);
                    entry.duplicate_rows_overwritten =
                        entry.duplicate_rows_overwritten.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    // clone out of the slot so a sink may itself install an override
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
