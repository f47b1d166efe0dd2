use crate::node::TableId;
use serde::{Deserialize, Serialize};

///
/// JoinColumn
/// One (parent column, child column) pair of a grouping join, by row position.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JoinColumn {
    pub parent: usize,
    pub child: usize,
}

///
/// ParentJoin
/// Grouping foreign key from a child table to its parent's primary key.
/// Pairs are ordered like the parent's primary key columns.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ParentJoin {
    pub name: String,
    pub parent: TableId,
    pub columns: Vec<JoinColumn>,
}

impl ParentJoin {
    /// Child-side column positions, in join order.
    #[must_use]
    pub fn child_columns(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.child).collect()
    }

    /// Child column paired with the given parent column, if any.
    #[must_use]
    pub fn child_for_parent(&self, parent_position: usize) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.parent == parent_position)
            .map(|c| c.child)
    }
}
