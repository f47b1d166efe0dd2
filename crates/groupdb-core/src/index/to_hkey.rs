use crate::{error::ResolveError, hkey::HKeyValue, ordinal::Ordinal};
use serde::{Deserialize, Serialize};

///
/// HKeyEntry
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum HKeyEntry {
    Ordinal(Ordinal),

    /// Position within the index row.
    IndexRow(usize),
}

///
/// IndexToHKey
/// One entry per flattened hkey position of the target table.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexToHKey {
    entries: Vec<HKeyEntry>,
}

impl IndexToHKey {
    pub(crate) const fn new(entries: Vec<HKeyEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[HKeyEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn ordinal(&self, position: usize) -> Option<Ordinal> {
        match self.entries.get(position) {
            Some(HKeyEntry::Ordinal(ordinal)) => Some(*ordinal),
            _ => None,
        }
    }

    #[must_use]
    pub fn index_row_position(&self, position: usize) -> Option<usize> {
        match self.entries.get(position) {
            Some(HKeyEntry::IndexRow(at)) => Some(*at),
            _ => None,
        }
    }

    /// Rebuild hkey values from one index row.
    pub fn resolve<V: Clone>(&self, index_row: &[V]) -> Result<Vec<HKeyValue<V>>, ResolveError> {
        self.entries
            .iter()
            .map(|entry| match entry {
                HKeyEntry::Ordinal(ordinal) => Ok(HKeyValue::Ordinal(*ordinal)),
                HKeyEntry::IndexRow(at) => index_row
                    .get(*at)
                    .cloned()
                    .map(HKeyValue::Column)
                    .ok_or(ResolveError::RowFieldMissing { position: *at }),
            })
            .collect()
    }
}
