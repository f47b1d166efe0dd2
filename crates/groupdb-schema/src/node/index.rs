use crate::node::{ColumnRef, TableId};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Not;

///
/// TableIndexDef
/// Secondary index over columns of a single table.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableIndexDef {
    pub name: String,
    pub columns: Vec<usize>,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub unique: bool,
}

///
/// JoinType
/// Join semantics of a group index; picks which equivalent column
/// stands in for an undeclared hkey column.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum JoinType {
    #[default]
    Left,
    Right,
}

///
/// GroupIndexDef
/// Index whose columns may come from several tables of one group.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupIndexDef {
    pub name: String,

    /// Root table naming the group the index belongs to.
    pub root: TableId,
    pub columns: Vec<ColumnRef>,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub unique: bool,

    #[serde(default)]
    pub join_type: JoinType,
}
