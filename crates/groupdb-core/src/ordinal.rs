//! Per-group table ordinals.
//!
//! Ordinals discriminate tables inside a group's keyspace, so once issued
//! they are never handed to another table, even after the owner is dropped.

#[cfg(test)]
mod tests;

use crate::{error::OrdinalError, group::GroupMembership};
use derive_more::Display;
use groupdb_schema::node::{Schema, TableName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Ordinal
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Ordinal(pub u32);

impl Ordinal {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

///
/// GroupOrdinals
///
/// Ordinal state of one group, owned by the caller and threaded through
/// successive compilations. `retired` remembers ordinals of dropped tables;
/// `high_water` is the largest ordinal ever issued.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupOrdinals {
    assigned: BTreeMap<TableName, Ordinal>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    retired: BTreeMap<Ordinal, TableName>,

    #[serde(default)]
    high_water: u32,
}

impl GroupOrdinals {
    #[must_use]
    pub fn get(&self, table: &TableName) -> Option<Ordinal> {
        self.assigned.get(table).copied()
    }

    #[must_use]
    pub const fn assigned(&self) -> &BTreeMap<TableName, Ordinal> {
        &self.assigned
    }

    #[must_use]
    pub const fn retired(&self) -> &BTreeMap<Ordinal, TableName> {
        &self.retired
    }

    #[must_use]
    pub const fn high_water(&self) -> u32 {
        self.high_water
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Retire every live ordinal, as when the whole group is dropped.
    pub fn retire_all(&mut self) {
        for (name, ordinal) in std::mem::take(&mut self.assigned) {
            self.high_water = self.high_water.max(ordinal.0);
            self.retired.insert(ordinal, name);
        }
    }

    // Ensure no ordinal is held twice, live or retired.
    fn check_conflicts(&self) -> Result<(), OrdinalError> {
        let mut holders: BTreeMap<Ordinal, &TableName> = BTreeMap::new();

        for (name, ordinal) in &self.assigned {
            if let Some(first) = holders.insert(*ordinal, name) {
                return Err(OrdinalError::Conflict {
                    ordinal: *ordinal,
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }
        for (ordinal, name) in &self.retired {
            if let Some(live) = holders.get(ordinal) {
                return Err(OrdinalError::Conflict {
                    ordinal: *ordinal,
                    first: live.to_string(),
                    second: name.to_string(),
                });
            }
        }

        Ok(())
    }

    // Highest ordinal seen anywhere in this state.
    fn ceiling(&self) -> u32 {
        self.assigned
            .values()
            .chain(self.retired.keys())
            .map(|o| o.0)
            .fold(self.high_water, u32::max)
    }
}

///
/// OrdinalAssigner
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OrdinalAssigner {
    base: u32,
    max: u32,
}

impl OrdinalAssigner {
    #[must_use]
    pub const fn new(base: u32, max: u32) -> Self {
        Self { base, max }
    }

    /// Assign ordinals for every member of the group, in preorder.
    ///
    /// Surviving tables keep their ordinal; new tables draw from above the
    /// high-water mark; tables missing from `membership` are retired.
    pub fn assign(
        &self,
        schema: &Schema,
        membership: &GroupMembership,
        previous: &GroupOrdinals,
    ) -> Result<GroupOrdinals, OrdinalError> {
        previous.check_conflicts()?;

        let mut next = previous.ceiling().checked_add(1).map(|n| n.max(self.base));
        let mut assigned = BTreeMap::new();

        for table in membership.tables().filter_map(|id| schema.table(id)) {
            let ordinal = match previous.get(&table.name) {
                Some(ordinal) => ordinal,
                None => {
                    let ordinal = next.filter(|n| *n <= self.max).map(Ordinal).ok_or_else(|| {
                        OrdinalError::Exhausted {
                            table: table.name.to_string(),
                            max: self.max,
                        }
                    })?;
                    next = ordinal.0.checked_add(1);
                    ordinal
                }
            };
            assigned.insert(table.name.clone(), ordinal);
        }

        let mut retired = previous.retired.clone();
        for (name, ordinal) in &previous.assigned {
            if !assigned.contains_key(name) {
                retired.insert(*ordinal, name.clone());
            }
        }

        let high_water = assigned
            .values()
            .map(|o: &Ordinal| o.0)
            .fold(previous.ceiling(), u32::max);

        Ok(GroupOrdinals {
            assigned,
            retired,
            high_water,
        })
    }
}
