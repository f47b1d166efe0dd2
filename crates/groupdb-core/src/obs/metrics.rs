use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for compiler activity.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub groups: BTreeMap<String, GroupCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Compilation
    pub compile_calls: u64,
    pub groups_compiled: u64,
    pub tables_compiled: u64,
    pub indexes_compiled: u64,

    // Rejections by class
    pub schema_inconsistencies: u64,
    pub invariant_violations: u64,
    pub ordinal_exhaustions: u64,

    // Ordinals
    pub ordinals_issued: u64,
    pub ordinals_retired: u64,

    // Publication
    pub snapshots_published: u64,
    pub snapshots_dropped: u64,
}

///
/// GroupCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupCounters {
    pub compile_calls: u64,
    pub rejections: u64,
    pub tables: u64,
    pub indexes: u64,
    pub snapshots_published: u64,
}

/// Point-in-time copy of the counters.
pub type EventReport = EventState;

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn report() -> EventReport {
    with_state(Clone::clone)
}

pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}
