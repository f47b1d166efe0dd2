//! Physical metadata compiler for group-clustered tables.
//!
//! Turns a [`Schema`](groupdb_schema::node::Schema) into per-group ordinals,
//! hierarchical key shapes, and for every index the fields it stores plus the
//! recipe that rebuilds a full hkey from one of its rows.

pub mod catalog;
pub mod compile;
pub mod error;
pub mod group;
pub mod hkey;
pub mod index;
pub mod obs;
pub mod ordinal;

#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        catalog::Catalog,
        compile::{CompiledGroup, CompiledTable, Compiler},
        error::{CompileError, ErrorClass},
        group::{GroupMember, GroupMembership, GroupRowLayout},
        hkey::{HKey, HKeyColumn, HKeySegment, HKeyValue},
        index::{CompiledIndex, HKeyEntry, IndexRowComposition, IndexToHKey, RowSource},
        ordinal::{GroupOrdinals, Ordinal, OrdinalAssigner},
    };
}
