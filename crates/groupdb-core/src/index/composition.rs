use crate::{error::ResolveError, hkey::HKeyValue};
use groupdb_schema::node::ColumnRef;
use serde::{Deserialize, Serialize};

///
/// RowSource
/// Where one stored index field comes from.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RowSource {
    /// Read from a row. `field` is the column position for table indexes and
    /// the flattened group row position for group indexes.
    Field { column: ColumnRef, field: usize },

    /// Copied from the indexed row's hkey at this flattened position.
    InheritedHKey(usize),
}

///
/// IndexRowComposition
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexRowComposition {
    sources: Vec<RowSource>,
    declared: usize,
}

impl IndexRowComposition {
    pub(crate) const fn new(sources: Vec<RowSource>, declared: usize) -> Self {
        Self { sources, declared }
    }

    #[must_use]
    pub fn sources(&self) -> &[RowSource] {
        &self.sources
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Number of leading sources that come from declared index columns.
    #[must_use]
    pub const fn declared_len(&self) -> usize {
        self.declared
    }

    /// Sources appended only to make the hkey recoverable.
    #[must_use]
    pub fn extra(&self) -> &[RowSource] {
        &self.sources[self.declared.min(self.sources.len())..]
    }

    /// Row field of the source at `index`, if it is a field source.
    #[must_use]
    pub fn field_position(&self, index: usize) -> Option<usize> {
        match self.sources.get(index) {
            Some(RowSource::Field { field, .. }) => Some(*field),
            _ => None,
        }
    }

    /// Hkey position of the source at `index`, if it is inherited.
    #[must_use]
    pub fn hkey_position(&self, index: usize) -> Option<usize> {
        match self.sources.get(index) {
            Some(RowSource::InheritedHKey(position)) => Some(*position),
            _ => None,
        }
    }

    /// First source reading `column` directly.
    #[must_use]
    pub fn position_of(&self, column: ColumnRef) -> Option<usize> {
        self.sources
            .iter()
            .position(|s| matches!(s, RowSource::Field { column: c, .. } if *c == column))
    }

    /// Build an index row from a data row and that row's materialized hkey.
    pub fn project<V: Clone>(
        &self,
        row: &[V],
        hkey: &[HKeyValue<V>],
    ) -> Result<Vec<V>, ResolveError> {
        self.sources
            .iter()
            .map(|source| match source {
                RowSource::Field { field, .. } => row
                    .get(*field)
                    .cloned()
                    .ok_or(ResolveError::RowFieldMissing { position: *field }),
                RowSource::InheritedHKey(position) => match hkey.get(*position) {
                    Some(HKeyValue::Column(value)) => Ok(value.clone()),
                    Some(HKeyValue::Ordinal(_)) => Err(ResolveError::OrdinalSlot {
                        position: *position,
                    }),
                    None => Err(ResolveError::ParentValueMissing {
                        position: *position,
                    }),
                },
            })
            .collect()
    }
}
