use crate::node::{Column, ColumnRef, GroupIndexDef, Table, TableId, TableName};
use serde::{Deserialize, Serialize};

///
/// Schema
/// Immutable snapshot of the logical schema graph.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schema {
    pub(crate) tables: Vec<Table>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) group_indexes: Vec<GroupIndexDef>,
}

impl Schema {
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.index())
    }

    #[must_use]
    pub fn table_by_name(&self, name: &TableName) -> Option<&Table> {
        self.tables.iter().find(|t| &t.name == name)
    }

    /// Direct children of a table, in declaration order.
    pub fn children(&self, id: TableId) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(move |t| t.parent() == Some(id))
    }

    #[must_use]
    pub fn column(&self, column: ColumnRef) -> Option<&Column> {
        self.table(column.table)
            .and_then(|t| t.column_at(column.position))
    }

    /// Render a column reference as `schema.table.column` for diagnostics.
    #[must_use]
    pub fn column_label(&self, column: ColumnRef) -> String {
        match (self.table(column.table), self.column(column)) {
            (Some(table), Some(col)) => format!("{}.{}", table.name, col.name),
            _ => column.to_string(),
        }
    }

    #[must_use]
    pub fn group_indexes(&self) -> &[GroupIndexDef] {
        &self.group_indexes
    }

    /// Group index definitions declared against the given root table.
    pub fn group_indexes_for(&self, root: TableId) -> impl Iterator<Item = &GroupIndexDef> {
        self.group_indexes.iter().filter(move |i| i.root == root)
    }
}
