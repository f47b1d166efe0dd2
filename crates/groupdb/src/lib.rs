//! ## Crate layout
//! - `config`: compiler settings loaded from TOML.
//! - `core`: grouping, ordinals, hkeys, index composition and the catalog.
//! - `schema`: schema graph, builder and validation.
//!
//! The top-level functions wire a [`CompilerConfig`] through the builder,
//! the compiler and the catalog so callers don't have to.

pub use groupdb_config as config;
pub use groupdb_core as core;
pub use groupdb_schema as schema;

mod error;


pub use error::{Error, ErrorKind};

use groupdb_config::CompilerConfig;
use groupdb_core::{
    catalog::Catalog,
    compile::{CompiledGroup, Compiler},
    ordinal::GroupOrdinals,
};
use groupdb_schema::{
    build::SchemaBuilder,
    node::{Schema, TableName},
};
use std::{collections::BTreeMap, path::Path};
use tracing::debug;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read and validate a TOML config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<CompilerConfig, Error> {
    Ok(CompilerConfig::load(path)?)
}

/// Schema builder that names surrogate keys the way `config` says.
#[must_use]
pub fn schema_builder(config: &CompilerConfig, schema: &str) -> SchemaBuilder {
    SchemaBuilder::new(schema).with_surrogate_column(&config.surrogate_column)
}

/// Compile every group of `schema` from fresh ordinals.
pub fn compile(
    config: &CompilerConfig,
    schema: &Schema,
) -> Result<BTreeMap<TableName, CompiledGroup>, Error> {
    compile_with_ordinals(config, schema, &BTreeMap::new())
}

/// Compile every group of `schema`, continuing from persisted ordinal state.
pub fn compile_with_ordinals(
    config: &CompilerConfig,
    schema: &Schema,
    previous: &BTreeMap<TableName, GroupOrdinals>,
) -> Result<BTreeMap<TableName, CompiledGroup>, Error> {
    debug!(
        tables = schema.tables().len(),
        seeded = previous.len(),
        "compiling schema"
    );

    Ok(Compiler::new(config).compile(schema, previous)?)
}

/// Empty catalog compiling with `config`.
#[must_use]
pub fn catalog(config: &CompilerConfig) -> Catalog {
    Catalog::new(Compiler::new(config))
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind,
        config::CompilerConfig,
        core::prelude::*,
        schema::prelude::*,
    };
}
