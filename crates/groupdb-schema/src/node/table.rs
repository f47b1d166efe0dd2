use crate::node::{Column, ColumnRef, ParentJoin, TableIndexDef, TableName};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// TableId
/// Arena handle for a table; equals its declaration order in the schema.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("t{_0}")]
pub struct TableId(pub u32);

impl TableId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

///
/// PrimaryKeySource
/// Declares where a table's primary key comes from.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PrimaryKeySource {
    #[default]
    Declared,

    /// Single internal column added because no key was declared.
    Surrogate,
}

///
/// PrimaryKey
/// Ordered, non-empty list of column positions of one table.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PrimaryKey {
    pub columns: Vec<usize>,

    #[serde(default)]
    pub source: PrimaryKeySource,
}

impl PrimaryKey {
    #[must_use]
    pub const fn is_surrogate(&self) -> bool {
        matches!(self.source, PrimaryKeySource::Surrogate)
    }
}

///
/// Table
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Table {
    pub id: TableId,
    pub name: TableName,

    /// Row layout, internal columns included.
    pub columns: Vec<Column>,
    pub primary_key: PrimaryKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_join: Option<ParentJoin>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<TableIndexDef>,
}

impl Table {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_join.is_none()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    #[must_use]
    pub const fn column_ref(&self, position: usize) -> ColumnRef {
        ColumnRef::new(self.id, position)
    }

    /// Columns visible to users, internal columns excluded.
    pub fn declared_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.internal)
    }

    /// The primary key as declared, `None` when a surrogate stands in.
    #[must_use]
    pub fn declared_primary_key(&self) -> Option<&PrimaryKey> {
        (!self.primary_key.is_surrogate()).then_some(&self.primary_key)
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&TableIndexDef> {
        self.indexes.iter().find(|i| i.name == name)
    }

    #[must_use]
    pub fn parent(&self) -> Option<TableId> {
        self.parent_join.as_ref().map(|j| j.parent)
    }
}
