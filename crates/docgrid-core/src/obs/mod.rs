//! Observability: snapshot build telemetry (metrics) and sink abstractions.
//!
//! Snapshot construction never touches metrics state directly; it emits
//! `MetricsEvent`s through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, TableCounters};
pub use sink::{
    MetricsEvent, MetricsSink, RejectReason, metrics_report, metrics_reset_all, with_metrics_sink,
};
