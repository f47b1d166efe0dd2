//! Index composition.
//!
//! For every index the composer decides which fields its rows store and how
//! to rebuild the indexed row's hkey from them.

mod compose;
mod composition;
mod to_hkey;


pub use compose::{IndexComposer, IndexTarget};
pub use composition::{IndexRowComposition, RowSource};
pub use to_hkey::{HKeyEntry, IndexToHKey};

use groupdb_schema::node::{ColumnRef, JoinType, TableId};
use serde::{Deserialize, Serialize};

///
/// TableIndex
/// Compiled single-table index (secondary, unique or primary).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableIndex {
    pub name: String,
    pub table: TableId,
    pub columns: Vec<usize>,
    pub unique: bool,
    pub composition: IndexRowComposition,
    pub to_hkey: IndexToHKey,
}

///
/// GroupIndex
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupIndex {
    pub name: String,
    pub root: TableId,
    pub columns: Vec<ColumnRef>,
    pub unique: bool,
    pub join_type: JoinType,
    pub rootmost: TableId,
    pub leafmost: TableId,
    pub composition: IndexRowComposition,

    /// Recipe for the leafmost table's hkey.
    pub to_hkey: IndexToHKey,

    /// Recipes for the leafmost table's ancestors, indexed by depth.
    pub ancestor_to_hkeys: Vec<IndexToHKey>,
}

impl GroupIndex {
    #[must_use]
    pub const fn leaf_depth(&self) -> usize {
        self.ancestor_to_hkeys.len()
    }

    /// Recipe for the hkey of the branch table at `depth`.
    #[must_use]
    pub fn to_hkey_at(&self, depth: usize) -> Option<&IndexToHKey> {
        if depth == self.leaf_depth() {
            Some(&self.to_hkey)
        } else {
            self.ancestor_to_hkeys.get(depth)
        }
    }
}

///
/// CompiledIndex
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CompiledIndex {
    Table(TableIndex),
    Primary(TableIndex),
    Group(GroupIndex),
}

impl CompiledIndex {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Table(i) | Self::Primary(i) => &i.name,
            Self::Group(i) => &i.name,
        }
    }

    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self, Self::Primary(_))
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        match self {
            Self::Primary(_) => true,
            Self::Table(i) => i.unique,
            Self::Group(i) => i.unique,
        }
    }

    /// Table whose hkey [`Self::to_hkey`] rebuilds.
    #[must_use]
    pub const fn leafmost(&self) -> TableId {
        match self {
            Self::Table(i) | Self::Primary(i) => i.table,
            Self::Group(i) => i.leafmost,
        }
    }

    #[must_use]
    pub const fn composition(&self) -> &IndexRowComposition {
        match self {
            Self::Table(i) | Self::Primary(i) => &i.composition,
            Self::Group(i) => &i.composition,
        }
    }

    #[must_use]
    pub const fn to_hkey(&self) -> &IndexToHKey {
        match self {
            Self::Table(i) | Self::Primary(i) => &i.to_hkey,
            Self::Group(i) => &i.to_hkey,
        }
    }
}
