//! Logical schema graph consumed by the groupdb compiler.
//!
//! Tables, columns, primary keys, grouping joins and index declarations are
//! plain value objects. They are assembled through [`build::SchemaBuilder`],
//! which performs every check that does not need group-level knowledge.

pub mod build;
pub mod error;
pub mod node;
pub mod validate;

/// Maximum length for table, column and index identifiers.
pub const MAX_IDENT_LEN: usize = 64;

/// Default name of the internal surrogate key column.
pub const DEFAULT_SURROGATE_COLUMN: &str = "__row_id";

/// Declared type of the internal surrogate key column.
pub const SURROGATE_COLUMN_TYPE: &str = "BIGINT";

/// Name given to every table's primary-key index.
pub const PRIMARY_INDEX_NAME: &str = "PRIMARY";

use crate::build::SchemaBuildError;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::SchemaBuilder,
        error::{ErrorTree, SchemaError},
        node::*,
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    BuildError(#[from] SchemaBuildError),
}
