//! Metrics sink boundary.
//!
//! Compiler code never touches `obs::metrics` directly; every counter
//! update is a `MetricsEvent` routed through a `MetricsSink`.

use crate::{error::ErrorClass, obs::metrics};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    CompileStart {
        group: &'a str,
    },
    GroupCompiled {
        group: &'a str,
        tables: u64,
        indexes: u64,
        ordinals_issued: u64,
        ordinals_retired: u64,
    },
    CompileRejected {
        group: &'a str,
        class: ErrorClass,
    },
    SnapshotPublished {
        group: &'a str,
    },
    SnapshotDropped {
        group: &'a str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// LocalMetricsSink
/// Default sink writing into the thread-local counters.
/// Used whenever no scoped override is installed.

pub(crate) struct LocalMetricsSink;

impl MetricsSink for LocalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::CompileStart { group } => {
                metrics::with_state_mut(|m| {
                    m.ops.compile_calls = m.ops.compile_calls.saturating_add(1);
                    let entry = m.groups.entry(group.to_string()).or_default();
                    entry.compile_calls = entry.compile_calls.saturating_add(1);
                });
            }

            MetricsEvent::GroupCompiled {
                group,
                tables,
                indexes,
                ordinals_issued,
                ordinals_retired,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.groups_compiled = m.ops.groups_compiled.saturating_add(1);
                    m.ops.tables_compiled = m.ops.tables_compiled.saturating_add(tables);
                    m.ops.indexes_compiled = m.ops.indexes_compiled.saturating_add(indexes);
                    m.ops.ordinals_issued = m.ops.ordinals_issued.saturating_add(ordinals_issued);
                    m.ops.ordinals_retired =
                        m.ops.ordinals_retired.saturating_add(ordinals_retired);

                    let entry = m.groups.entry(group.to_string()).or_default();
                    entry.tables = tables;
                    entry.indexes = indexes;
                });
            }

            MetricsEvent::CompileRejected { group, class } => {
                metrics::with_state_mut(|m| {
                    match class {
                        ErrorClass::SchemaInconsistency => {
                            m.ops.schema_inconsistencies =
                                m.ops.schema_inconsistencies.saturating_add(1);
                        }
                        ErrorClass::InvariantViolation => {
                            m.ops.invariant_violations =
                                m.ops.invariant_violations.saturating_add(1);
                        }
                        ErrorClass::OrdinalExhaustion => {
                            m.ops.ordinal_exhaustions = m.ops.ordinal_exhaustions.saturating_add(1);
                        }
                    }

                    let entry = m.groups.entry(group.to_string()).or_default();
                    entry.rejections = entry.rejections.saturating_add(1);
                });
            }

            MetricsEvent::SnapshotPublished { group } => {
                metrics::with_state_mut(|m| {
                    m.ops.snapshots_published = m.ops.snapshots_published.saturating_add(1);
                    let entry = m.groups.entry(group.to_string()).or_default();
                    entry.snapshots_published = entry.snapshots_published.saturating_add(1);
                });
            }

            MetricsEvent::SnapshotDropped { group: _ } => {
                metrics::with_state_mut(|m| {
                    m.ops.snapshots_dropped = m.ops.snapshots_dropped.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const LOCAL_METRICS_SINK: LocalMetricsSink = LocalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` comes from a live `&dyn MetricsSink` installed by `with_metrics_sink`,
        //   which restores the previous slot on every exit, unwinding included.
        // - `record` dereferences synchronously and never keeps `ptr`.
        // - Only a shared reference is materialized, matching the original borrow.
        unsafe { (&*ptr).record(event) };
    } else {
        LOCAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's compiler counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all counters on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - The erased pointer lives in the slot only for this dynamic scope;
    //   `Guard` restores the previous value on all exits.
    // - `record` only dereferences it synchronously, so it never outlives `sink`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}
