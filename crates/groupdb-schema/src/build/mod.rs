//! Fluent, name-addressed construction of a [`Schema`].
//!
//! Declarations are recorded verbatim and resolved in one pass by
//! [`SchemaBuilder::build`], which reports every problem it finds at once.


use crate::{
    DEFAULT_SURROGATE_COLUMN,
    error::{ErrorTree, SchemaError},
    node::{JoinType, Schema},
    validate::resolve_schema,
};
use thiserror::Error as ThisError;

///
/// SchemaBuildError
///

#[derive(Debug, ThisError)]
pub enum SchemaBuildError {
    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),
}

impl SchemaBuildError {
    #[must_use]
    pub const fn errors(&self) -> &ErrorTree {
        match self {
            Self::Validation(tree) => tree,
        }
    }
}

// Raw declarations, kept as written until build time.

#[derive(Clone, Debug)]
pub(crate) struct PendingColumn {
    pub name: String,
    pub ty: String,
    pub nullable: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingJoin {
    pub parent: String,
    /// (child column, parent column) pairs.
    pub pairs: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingIndex {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingTable {
    pub schema: String,
    pub name: String,
    pub columns: Vec<PendingColumn>,
    pub primary_key: Option<Vec<String>>,
    pub joins: Vec<PendingJoin>,
    pub indexes: Vec<PendingIndex>,
}

#[derive(Clone, Debug)]
pub(crate) struct PendingGroupIndex {
    pub root: String,
    pub name: String,
    /// (table, column) pairs.
    pub columns: Vec<(String, String)>,
    pub unique: bool,
    pub join_type: JoinType,
}

///
/// SchemaBuilder
///

#[derive(Clone, Debug)]
pub struct SchemaBuilder {
    schema: String,
    surrogate_column: String,
    tables: Vec<PendingTable>,
    group_indexes: Vec<PendingGroupIndex>,
    errors: ErrorTree,
}

impl SchemaBuilder {
    /// Start a builder whose unqualified table names live in `schema`.
    #[must_use]
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            surrogate_column: DEFAULT_SURROGATE_COLUMN.to_string(),
            tables: Vec::new(),
            group_indexes: Vec::new(),
            errors: ErrorTree::new(),
        }
    }

    /// Override the name of the internal surrogate key column.
    #[must_use]
    pub fn with_surrogate_column(mut self, name: &str) -> Self {
        self.surrogate_column = name.to_string();
        self
    }

    /// Switch the schema used for subsequent unqualified table names.
    #[must_use]
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = schema.to_string();
        self
    }

    /// Begin declaring a table; following column/key/join/index calls apply to it.
    #[must_use]
    pub fn table(mut self, name: &str) -> Self {
        self.tables.push(PendingTable {
            schema: self.schema.clone(),
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: None,
            joins: Vec::new(),
            indexes: Vec::new(),
        });
        self
    }

    #[must_use]
    pub fn column(mut self, name: &str, ty: &str, nullable: bool) -> Self {
        if let Some(table) = self.current() {
            table.columns.push(PendingColumn {
                name: name.to_string(),
                ty: ty.to_string(),
                nullable,
            });
        }
        self
    }

    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        if let Some(table) = self.current() {
            table.primary_key = Some(to_strings(columns));
        }
        self
    }

    /// Declare the grouping join to `parent`, as (child column, parent column) pairs.
    #[must_use]
    pub fn join(mut self, parent: &str, pairs: &[(&str, &str)]) -> Self {
        if let Some(table) = self.current() {
            table.joins.push(PendingJoin {
                parent: parent.to_string(),
                pairs: pairs
                    .iter()
                    .map(|(child, parent)| ((*child).to_string(), (*parent).to_string()))
                    .collect(),
            });
        }
        self
    }

    #[must_use]
    pub fn index(self, name: &str, columns: &[&str]) -> Self {
        self.push_index(name, columns, false)
    }

    #[must_use]
    pub fn unique(self, name: &str, columns: &[&str]) -> Self {
        self.push_index(name, columns, true)
    }

    /// Declare an index over columns of several tables in the group rooted at `root`.
    #[must_use]
    pub fn group_index(
        mut self,
        root: &str,
        name: &str,
        unique: bool,
        join_type: JoinType,
        columns: &[(&str, &str)],
    ) -> Self {
        self.group_indexes.push(PendingGroupIndex {
            root: self.qualify(root),
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(table, column)| (self.qualify(table), (*column).to_string()))
                .collect(),
            unique,
            join_type,
        });
        self
    }

    /// Resolve every declaration into a [`Schema`].
    pub fn build(self) -> Result<Schema, SchemaBuildError> {
        let mut errors = self.errors;

        match resolve_schema(&self.tables, &self.group_indexes, &self.surrogate_column) {
            Ok(schema) if errors.is_empty() => Ok(schema),
            Ok(_) => Err(SchemaBuildError::Validation(errors)),
            Err(tree) => {
                errors.merge(tree);
                Err(SchemaBuildError::Validation(errors))
            }
        }
    }

    fn push_index(mut self, name: &str, columns: &[&str], unique: bool) -> Self {
        if let Some(table) = self.current() {
            table.indexes.push(PendingIndex {
                name: name.to_string(),
                columns: to_strings(columns),
                unique,
            });
        }
        self
    }

    fn current(&mut self) -> Option<&mut PendingTable> {
        if self.tables.is_empty() {
            self.errors.add(SchemaError::UnknownTable {
                table: "(no table declared yet)".to_string(),
            });
        }

        self.tables.last_mut()
    }

    fn qualify(&self, table: &str) -> String {
        if table.contains('.') {
            table.to_string()
        } else {
            format!("{}.{table}", self.schema)
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
