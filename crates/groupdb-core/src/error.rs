use crate::ordinal::Ordinal;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ErrorClass
/// Coarse taxonomy shared by every compilation failure.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ErrorClass {
    /// The compiler itself failed to uphold a guarantee; never user-caused.
    InvariantViolation,
    OrdinalExhaustion,
    SchemaInconsistency,
}

///
/// GroupError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum GroupError {
    #[error("table '{table}' does not reach a group root through its parent joins")]
    Disconnected { table: String },

    #[error("table '{table}' has a parent join and cannot root a group")]
    NotARoot { table: String },

    #[error("unknown table '{table}'")]
    UnknownTable { table: String },
}

///
/// OrdinalError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum OrdinalError {
    #[error("ordinal {ordinal} is held by both '{first}' and '{second}'")]
    Conflict {
        ordinal: Ordinal,
        first: String,
        second: String,
    },

    #[error("no ordinal left for table '{table}' (max {max})")]
    Exhausted { table: String, max: u32 },
}

///
/// ComposeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ComposeError {
    #[error("group index '{index}' spans tables on different branches ('{table}' is off the leafmost path)")]
    BranchingGroupIndex { index: String, table: String },

    #[error("index '{index}' cannot source hkey position {position}")]
    Coverage { index: String, position: usize },

    #[error("index '{index}' has no columns")]
    EmptyIndex { index: String },

    #[error("index '{index}' references '{table}', which is outside its group")]
    OutsideGroup { index: String, table: String },

    #[error("index '{index}' declares {columns} columns, more than the limit of {max}")]
    TooManyColumns {
        index: String,
        columns: usize,
        max: usize,
    },

    #[error("index '{index}' references unknown column '{column}'")]
    UnknownColumn { index: String, column: String },
}

///
/// ResolveError
/// Failure while applying compiled recipes to concrete values.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ResolveError {
    #[error("hkey position {position} is an ordinal slot, not a column value")]
    OrdinalSlot { position: usize },

    #[error("value for hkey position {position} must come from the parent hkey, which is missing or too short")]
    ParentValueMissing { position: usize },

    #[error("row has no field at position {position}")]
    RowFieldMissing { position: usize },
}

///
/// CompileError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Ordinal(#[from] OrdinalError),
}

impl CompileError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Compose(ComposeError::Coverage { .. }) => ErrorClass::InvariantViolation,
            Self::Compose(_) | Self::Group(_) => ErrorClass::SchemaInconsistency,
            Self::Ordinal(_) => ErrorClass::OrdinalExhaustion,
        }
    }
}
