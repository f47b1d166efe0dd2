//! Schema graph value objects.
//!
//! Tables live in a flat arena inside [`Schema`]; every cross reference
//! (parent join, column reference, group index root) is a [`TableId`] into
//! that arena rather than a pointer.

mod column;
mod index;
mod join;
mod name;
mod schema;
mod table;

pub use column::*;
pub use index::*;
pub use join::*;
pub use name::*;
pub use schema::*;
pub use table::*;
