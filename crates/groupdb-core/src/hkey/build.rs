use crate::{
    error::GroupError,
    group::GroupMembership,
    hkey::{HKey, HKeyColumn, HKeySegment},
    ordinal::{GroupOrdinals, Ordinal},
};
use groupdb_schema::node::{Schema, Table, TableId};
use std::collections::BTreeMap;
use tracing::debug;

///
/// HKeyBuilder
/// Derives hkey shapes root to leaf; a parent is always built before its children.
///

#[derive(Clone, Copy, Debug)]
pub struct HKeyBuilder<'a> {
    schema: &'a Schema,
}

impl<'a> HKeyBuilder<'a> {
    #[must_use]
    pub const fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Build the hkey of every group member.
    pub fn build_group(
        &self,
        membership: &GroupMembership,
        ordinals: &GroupOrdinals,
    ) -> Result<BTreeMap<TableId, HKey>, GroupError> {
        let mut hkeys = BTreeMap::new();

        for member in membership.members() {
            let table = self.table(member.table)?;
            let ordinal = ordinals
                .get(&table.name)
                .ok_or_else(|| GroupError::Disconnected {
                    table: table.name.to_string(),
                })?;
            let parent = member.parent.and_then(|p| hkeys.get(&p));
            let hkey = self.build(table, parent, ordinal)?;

            debug!(
                table = %table.name,
                ordinal = ordinal.get(),
                depth = member.depth,
                positions = hkey.len(),
                "hkey built"
            );
            hkeys.insert(table.id, hkey);
        }

        Ok(hkeys)
    }

    /// Build one table's hkey on top of its parent's.
    pub fn build(
        &self,
        table: &Table,
        parent: Option<&HKey>,
        ordinal: Ordinal,
    ) -> Result<HKey, GroupError> {
        let mut segments = match (&table.parent_join, parent) {
            (None, _) => Vec::new(),
            (Some(join), Some(parent)) => inherit(table, join.parent, parent, |p| {
                join.child_for_parent(p)
            }),
            (Some(_), None) => {
                return Err(GroupError::Disconnected {
                    table: table.name.to_string(),
                });
            }
        };

        let position = segments.iter().map(|s| 1 + s.columns.len()).sum::<usize>();
        let columns = new_columns(table)
            .into_iter()
            .enumerate()
            .map(|(i, pos)| {
                let column = table.column_ref(pos);
                HKeyColumn {
                    column,
                    position: position + 1 + i,
                    equivalents: vec![column],
                }
            })
            .collect();

        segments.push(HKeySegment {
            table: table.id,
            ordinal,
            position,
            columns,
        });

        Ok(HKey {
            table: table.id,
            segments,
        })
    }

    fn table(&self, id: TableId) -> Result<&'a Table, GroupError> {
        self.schema.table(id).ok_or_else(|| GroupError::UnknownTable {
            table: id.to_string(),
        })
    }
}

/// Primary key columns a table contributes to its own hkey segment.
///
/// The leading run of key columns that equal the join columns position for
/// position is already fixed by the parent; everything after the first
/// mismatch is new. A surrogate key is never elided.
#[must_use]
pub fn new_columns(table: &Table) -> Vec<usize> {
    let key = &table.primary_key.columns;

    match &table.parent_join {
        Some(join) if !table.primary_key.is_surrogate() => {
            let fk = join.child_columns();
            let shared = key.iter().zip(&fk).take_while(|(k, f)| k == f).count();
            key[shared..].to_vec()
        }
        _ => key.clone(),
    }
}

// Copy the parent's segments, re-pointing every parent-owned column the
// child's join maps onto the matching child column.
fn inherit(
    table: &Table,
    parent_table: TableId,
    parent: &HKey,
    child_for_parent: impl Fn(usize) -> Option<usize>,
) -> Vec<HKeySegment> {
    let mut segments = parent.segments.clone();

    for hc in segments.iter_mut().flat_map(|s| s.columns.iter_mut()) {
        if hc.column.table != parent_table {
            continue;
        }
        if let Some(child) = child_for_parent(hc.column.position) {
            hc.column = table.column_ref(child);
            hc.equivalents.push(hc.column);
        }
    }

    segments
}
