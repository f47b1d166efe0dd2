//! Hierarchical keys.
//!
//! A table's hkey is one segment per table on its path from the group root.
//! Flattened, each segment is an ordinal slot followed by the columns that
//! segment contributes, so a row's physical key sorts under its ancestors.

mod build;

#[cfg(test)]
mod tests;

pub use build::{HKeyBuilder, new_columns};

use crate::{error::ResolveError, ordinal::Ordinal};
use groupdb_schema::node::{ColumnRef, TableId};
use serde::{Deserialize, Serialize};

///
/// HKeyColumn
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HKeyColumn {
    /// Column read for this position: the deepest equivalent on the path.
    pub column: ColumnRef,

    /// Flattened position within the owning hkey.
    pub position: usize,

    /// Join-equivalent columns, root first; `column` is the last entry.
    pub equivalents: Vec<ColumnRef>,
}

///
/// HKeySegment
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HKeySegment {
    pub table: TableId,
    pub ordinal: Ordinal,

    /// Flattened position of this segment's ordinal slot.
    pub position: usize,
    pub columns: Vec<HKeyColumn>,
}

///
/// HKeySlot
/// One flattened hkey position.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HKeySlot<'a> {
    Ordinal(&'a HKeySegment),
    Column(&'a HKeyColumn),
}

///
/// HKeyValue
/// Concrete value at one flattened hkey position.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum HKeyValue<V> {
    Ordinal(Ordinal),
    Column(V),
}

///
/// HKey
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HKey {
    pub table: TableId,
    pub segments: Vec<HKeySegment>,
}

impl HKey {
    /// Number of flattened positions (ordinal slots included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| 1 + s.columns.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn leaf_segment(&self) -> Option<&HKeySegment> {
        self.segments.last()
    }

    /// Every hkey column across all segments, in position order.
    pub fn columns(&self) -> impl Iterator<Item = &HKeyColumn> {
        self.segments.iter().flat_map(|s| s.columns.iter())
    }

    /// Every flattened position, in order.
    pub fn slots(&self) -> impl Iterator<Item = HKeySlot<'_>> {
        self.segments.iter().flat_map(|s| {
            std::iter::once(HKeySlot::Ordinal(s)).chain(s.columns.iter().map(HKeySlot::Column))
        })
    }

    #[must_use]
    pub fn column_at(&self, position: usize) -> Option<&HKeyColumn> {
        self.columns().find(|c| c.position == position)
    }

    /// Build the concrete hkey of one row.
    ///
    /// Columns owned by this hkey's table are read from `row`; positions
    /// contributed by ancestors are copied from `parent`, the already
    /// materialized hkey of the row's parent (absent for roots).
    pub fn materialize<V: Clone>(
        &self,
        row: &[V],
        parent: Option<&[HKeyValue<V>]>,
    ) -> Result<Vec<HKeyValue<V>>, ResolveError> {
        let mut values = Vec::with_capacity(self.len());

        for slot in self.slots() {
            let value = match slot {
                HKeySlot::Ordinal(segment) => HKeyValue::Ordinal(segment.ordinal),
                HKeySlot::Column(hc) if hc.column.table == self.table => {
                    let value = row.get(hc.column.position).ok_or(ResolveError::RowFieldMissing {
                        position: hc.column.position,
                    })?;
                    HKeyValue::Column(value.clone())
                }
                HKeySlot::Column(hc) => parent
                    .and_then(|p| p.get(hc.position))
                    .cloned()
                    .ok_or(ResolveError::ParentValueMissing {
                        position: hc.position,
                    })?,
            };
            values.push(value);
        }

        Ok(values)
    }
}
