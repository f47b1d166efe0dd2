//! Observability: compiler counters and the sink they flow through.

pub(crate) mod metrics;
pub(crate) mod sink;


pub use metrics::{EventOps, EventReport, GroupCounters};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
