//! Compiler configuration, loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid configuration.


use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Ordinal handed to the first table of a fresh group; 0 is reserved.
pub const DEFAULT_ORDINAL_BASE: u32 = 1;

/// Highest ordinal the compiler may issue within one group.
pub const DEFAULT_MAX_ORDINAL: u32 = 65_535;

pub use groupdb_schema::DEFAULT_SURROGATE_COLUMN;

/// Upper bound on the declared columns of a single index.
pub const DEFAULT_MAX_INDEX_COLUMNS: usize = 32;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// CompilerConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub ordinal_base: u32,
    pub max_ordinal: u32,
    pub surrogate_column: String,
    pub max_index_columns: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            ordinal_base: DEFAULT_ORDINAL_BASE,
            max_ordinal: DEFAULT_MAX_ORDINAL,
            surrogate_column: DEFAULT_SURROGATE_COLUMN.to_string(),
            max_index_columns: DEFAULT_MAX_INDEX_COLUMNS,
        }
    }
}

impl CompilerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ordinal_base == 0 {
            return Err(ConfigError::Invalid(
                "ordinal_base must be at least 1; ordinal 0 is reserved".to_string(),
            ));
        }
        if self.ordinal_base > self.max_ordinal {
            return Err(ConfigError::Invalid(format!(
                "ordinal_base {} exceeds max_ordinal {}",
                self.ordinal_base, self.max_ordinal
            )));
        }
        if self.surrogate_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "surrogate_column must not be empty".to_string(),
            ));
        }
        if self.max_index_columns == 0 {
            return Err(ConfigError::Invalid(
                "max_index_columns must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
