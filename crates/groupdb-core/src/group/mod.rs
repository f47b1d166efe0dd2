//! Group discovery: which tables cluster together, in what order, at what depth.

mod layout;

#[cfg(test)]
mod tests;

pub use layout::GroupRowLayout;

use crate::error::GroupError;
use groupdb_schema::node::{Schema, TableId, TableName};
use serde::{Deserialize, Serialize};

///
/// GroupMember
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupMember {
    pub table: TableId,
    pub parent: Option<TableId>,

    /// Distance from the root; the root is depth 0.
    pub depth: usize,
}

///
/// GroupMembership
/// Tables of one group in preorder: root first, children in declaration order.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupMembership {
    name: TableName,
    root: TableId,
    members: Vec<GroupMember>,
}

impl GroupMembership {
    /// Collect the group rooted at `root`.
    pub fn of_root(schema: &Schema, root: TableId) -> Result<Self, GroupError> {
        let table = schema.table(root).ok_or_else(|| GroupError::UnknownTable {
            table: root.to_string(),
        })?;
        if !table.is_root() {
            return Err(GroupError::NotARoot {
                table: table.name.to_string(),
            });
        }

        let mut members = Vec::new();
        let mut stack = vec![(root, None, 0)];

        while let Some((id, parent, depth)) = stack.pop() {
            members.push(GroupMember {
                table: id,
                parent,
                depth,
            });

            let children: Vec<_> = schema.children(id).map(|t| t.id).collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }

        Ok(Self {
            name: table.name.clone(),
            root,
            members,
        })
    }

    /// Name of the group, which is its root table's name.
    #[must_use]
    pub const fn name(&self) -> &TableName {
        &self.name
    }

    #[must_use]
    pub const fn root(&self) -> TableId {
        self.root
    }

    #[must_use]
    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = TableId> + '_ {
        self.members.iter().map(|m| m.table)
    }

    #[must_use]
    pub fn member(&self, table: TableId) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.table == table)
    }

    #[must_use]
    pub fn contains(&self, table: TableId) -> bool {
        self.member(table).is_some()
    }

    #[must_use]
    pub fn depth(&self, table: TableId) -> Option<usize> {
        self.member(table).map(|m| m.depth)
    }

    /// Ancestors of `table` and the table itself, root first.
    #[must_use]
    pub fn path(&self, table: TableId) -> Vec<TableId> {
        let mut path = Vec::new();
        let mut cursor = self.member(table);

        while let Some(member) = cursor {
            path.push(member.table);
            cursor = member.parent.and_then(|p| self.member(p));
        }
        path.reverse();

        path
    }

    /// True when `ancestor` is `table` or lies on its path to the root.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: TableId, table: TableId) -> bool {
        self.path(table).contains(&ancestor)
    }
}

/// Follow parent joins from `table` to its group root.
///
/// A chain longer than the schema itself can only be a join cycle.
pub fn root_of(schema: &Schema, table: TableId) -> Result<TableId, GroupError> {
    let disconnected = || GroupError::Disconnected {
        table: schema
            .table(table)
            .map_or_else(|| table.to_string(), |t| t.name.to_string()),
    };

    let mut cursor = schema.table(table).ok_or_else(disconnected)?;
    for _ in 0..=schema.tables().len() {
        match cursor.parent() {
            None => return Ok(cursor.id),
            Some(parent) => cursor = schema.table(parent).ok_or_else(disconnected)?,
        }
    }

    Err(disconnected())
}

/// Derive every group of the schema, ordered by root declaration order.
///
/// Fails if any table cannot reach a root, so no table is silently left out.
pub fn discover(schema: &Schema) -> Result<Vec<GroupMembership>, GroupError> {
    for table in schema.tables() {
        root_of(schema, table.id)?;
    }

    schema
        .tables()
        .iter()
        .filter(|t| t.is_root())
        .map(|t| GroupMembership::of_root(schema, t.id))
        .collect()
}
