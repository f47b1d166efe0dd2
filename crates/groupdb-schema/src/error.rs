use serde::Serialize;
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// SchemaError
/// One build-time problem found in a schema declaration.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[remain::sorted]
pub enum SchemaError {
    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("'{owner}' declares index '{index}' more than once")]
    DuplicateIndex { owner: String, index: String },

    #[error("table '{table}' repeats column '{column}' in its primary key")]
    DuplicateKeyColumn { table: String, column: String },

    #[error("table '{table}' is declared more than once")]
    DuplicateTable { table: String },

    #[error("index '{index}' on '{owner}' has no columns")]
    EmptyIndex { owner: String, index: String },

    #[error("table '{table}' declares an empty primary key")]
    EmptyPrimaryKey { table: String },

    #[error("invalid identifier '{ident}': {reason}")]
    InvalidIdent { ident: String, reason: String },

    #[error(
        "join '{join}' has {join_columns} column pair(s) but the parent primary key has {parent_key}"
    )]
    JoinArityMismatch {
        join: String,
        parent_key: usize,
        join_columns: usize,
    },

    #[error("join '{join}' pairs parent column '{found}' at position {position}, expected '{expected}'")]
    JoinColumnMismatch {
        join: String,
        position: usize,
        expected: String,
        found: String,
    },

    #[error("table '{table}' has more than one parent join")]
    MultipleParentJoins { table: String },

    #[error("join '{join}' references '{parent}', which has no declared primary key")]
    ParentWithoutPrimaryKey { join: String, parent: String },

    #[error("table '{table}' cannot be its own parent")]
    SelfJoin { table: String },

    #[error("table '{table}' has no primary key but already declares column '{column}'")]
    SurrogateColumnClash { table: String, column: String },

    #[error("unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("unknown table '{table}'")]
    UnknownTable { table: String },
}

///
/// ErrorTree
/// Ordered collection of every problem found during one validation pass.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ErrorTree {
    errors: Vec<SchemaError>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, err: SchemaError) {
        self.errors.push(err);
    }

    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.errors.iter()
    }

    #[must_use]
    pub fn contains(&self, err: &SchemaError) -> bool {
        self.errors.contains(err)
    }

    /// Collapse into `Ok(())` when nothing was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

impl From<SchemaError> for ErrorTree {
    fn from(err: SchemaError) -> Self {
        Self { errors: vec![err] }
    }
}
