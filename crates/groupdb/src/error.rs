use derive_more::Display;
use groupdb_config::ConfigError;
use groupdb_core::error::{CompileError, ErrorClass};
use groupdb_schema::build::SchemaBuildError;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Class of a compile failure; `None` for config and schema errors.
    #[must_use]
    pub const fn class(&self) -> Option<ErrorClass> {
        match self.kind {
            ErrorKind::Compile(class) => Some(class),
            ErrorKind::Config | ErrorKind::Schema => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, err.to_string())
    }
}

impl From<SchemaBuildError> for Error {
    fn from(err: SchemaBuildError) -> Self {
        Self::new(ErrorKind::Schema, err.to_string())
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Self::new(ErrorKind::Compile(err.class()), err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Config,
    Schema,

    #[display("compile ({_0})")]
    Compile(ErrorClass),
}
