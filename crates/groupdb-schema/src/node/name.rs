use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// TableNameError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum TableNameError {
    #[error("table name '{0}' is not of the form schema.table")]
    Unqualified(String),
}

///
/// TableName
/// Schema-qualified table name, rendered and serialized as `schema.table`.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[display("{schema}.{name}")]
#[serde(into = "String", try_from = "String")]
pub struct TableName {
    schema: String,
    name: String,
}

impl TableName {
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for TableName {
    type Error = TableNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.split_once('.') {
            Some((schema, name)) if !schema.is_empty() && !name.is_empty() => {
                Ok(Self::new(schema, name))
            }
            _ => Err(TableNameError::Unqualified(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_qualified_name() {
        let name = TableName::new("s", "customer");
        assert_eq!(name.to_string(), "s.customer");
    }

    #[test]
    fn parses_back_from_string() {
        let name = TableName::try_from("s.order".to_string()).unwrap();
        assert_eq!(name, TableName::new("s", "order"));

        let err = TableName::try_from("order".to_string()).unwrap_err();
        assert_eq!(err, TableNameError::Unqualified("order".to_string()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&TableName::new("s", "item")).unwrap();
        assert_eq!(json, "\"s.item\"");
    }
}
