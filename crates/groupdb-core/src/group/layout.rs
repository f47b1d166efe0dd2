use crate::group::GroupMembership;
use groupdb_schema::node::{ColumnRef, Schema, TableId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// LayoutSpan
/// Slice of the flattened row owned by one member table.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LayoutSpan {
    pub table: TableId,
    pub offset: usize,
    pub width: usize,
}

///
/// GroupRowLayout
///
/// Synthetic row formed by concatenating every member's columns (internal
/// ones included) in group preorder. Group index fields are positions in
/// this row; storage still keeps each table's row separately.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupRowLayout {
    spans: Vec<LayoutSpan>,
    fields: Vec<ColumnRef>,
}

impl GroupRowLayout {
    #[must_use]
    pub fn assemble(schema: &Schema, membership: &GroupMembership) -> Self {
        let mut layout = Self::default();

        for table in membership.tables().filter_map(|id| schema.table(id)) {
            layout.spans.push(LayoutSpan {
                table: table.id,
                offset: layout.fields.len(),
                width: table.columns.len(),
            });
            layout
                .fields
                .extend(table.columns.iter().map(|c| table.column_ref(c.position)));
        }

        layout
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn spans(&self) -> &[LayoutSpan] {
        &self.spans
    }

    #[must_use]
    pub fn fields(&self) -> &[ColumnRef] {
        &self.fields
    }

    #[must_use]
    pub fn offset(&self, table: TableId) -> Option<usize> {
        self.span(table).map(|s| s.offset)
    }

    /// Flattened position of a member column.
    #[must_use]
    pub fn field_of(&self, column: ColumnRef) -> Option<usize> {
        self.span(column.table)
            .filter(|s| column.position < s.width)
            .map(|s| s.offset + column.position)
    }

    #[must_use]
    pub fn column_at(&self, field: usize) -> Option<ColumnRef> {
        self.fields.get(field).copied()
    }

    /// Build one flattened row from per-table rows, padding absent tables
    /// (the outer side of a join) and short rows with `missing`.
    #[must_use]
    pub fn flatten<V: Clone>(&self, rows: &BTreeMap<TableId, Vec<V>>, missing: &V) -> Vec<V> {
        let mut flat = Vec::with_capacity(self.fields.len());

        for span in &self.spans {
            let row = rows.get(&span.table);
            flat.extend((0..span.width).map(|i| {
                row.and_then(|r| r.get(i)).unwrap_or(missing).clone()
            }));
        }

        flat
    }

    fn span(&self, table: TableId) -> Option<&LayoutSpan> {
        self.spans.iter().find(|s| s.table == table)
    }
}
