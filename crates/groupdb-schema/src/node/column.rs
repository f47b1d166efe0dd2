use crate::node::TableId;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// ColumnRef
/// Physical column identity: owning table plus position within its row.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("{table}[{position}]")]
pub struct ColumnRef {
    pub table: TableId,
    pub position: usize,
}

impl ColumnRef {
    #[must_use]
    pub const fn new(table: TableId, position: usize) -> Self {
        Self { table, position }
    }
}

///
/// Column
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub position: usize,

    /// Declared SQL type; opaque to the compiler.
    pub ty: String,
    pub nullable: bool,

    /// Set for columns the engine adds on its own (the surrogate key).
    #[serde(default)]
    pub internal: bool,
}
