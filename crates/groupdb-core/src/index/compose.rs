use crate::{
    error::ComposeError,
    group::{GroupMembership, GroupRowLayout},
    hkey::{HKey, HKeyColumn, HKeySlot},
    index::{
        CompiledIndex, GroupIndex, HKeyEntry, IndexRowComposition, IndexToHKey, RowSource,
        TableIndex,
    },
};
use groupdb_schema::{
    PRIMARY_INDEX_NAME,
    node::{ColumnRef, GroupIndexDef, JoinType, Schema, Table, TableId, TableIndexDef},
};
use std::collections::BTreeMap;
use tracing::debug;

///
/// IndexTarget
/// Closed set of index kinds the composer understands.
///

#[derive(Clone, Copy, Debug)]
pub enum IndexTarget<'a> {
    Table {
        table: &'a Table,
        index: &'a TableIndexDef,
    },
    Primary {
        table: &'a Table,
    },
    Group {
        index: &'a GroupIndexDef,
    },
}

///
/// IndexComposer
///

#[derive(Clone, Copy, Debug)]
pub struct IndexComposer<'a> {
    schema: &'a Schema,
    membership: &'a GroupMembership,
    hkeys: &'a BTreeMap<TableId, HKey>,
    layout: &'a GroupRowLayout,
    max_index_columns: usize,
}

impl<'a> IndexComposer<'a> {
    #[must_use]
    pub const fn new(
        schema: &'a Schema,
        membership: &'a GroupMembership,
        hkeys: &'a BTreeMap<TableId, HKey>,
        layout: &'a GroupRowLayout,
        max_index_columns: usize,
    ) -> Self {
        Self {
            schema,
            membership,
            hkeys,
            layout,
            max_index_columns,
        }
    }

    pub fn compose(&self, target: IndexTarget<'_>) -> Result<CompiledIndex, ComposeError> {
        let compiled = match target {
            IndexTarget::Table { table, index } => CompiledIndex::Table(self.table_index(
                table,
                &index.name,
                &index.columns,
                index.unique,
            )?),
            IndexTarget::Primary { table } => CompiledIndex::Primary(self.table_index(
                table,
                PRIMARY_INDEX_NAME,
                &table.primary_key.columns,
                true,
            )?),
            IndexTarget::Group { index } => CompiledIndex::Group(self.group_index(index)?),
        };

        debug!(
            index = compiled.name(),
            table = %compiled.leafmost(),
            fields = compiled.composition().len(),
            extra = compiled.composition().extra().len(),
            "index composed"
        );

        Ok(compiled)
    }

    // Declared columns first, then whatever the table's hkey still needs:
    // own columns are read from the row, ancestor columns are inherited.
    fn table_index(
        &self,
        table: &Table,
        name: &str,
        columns: &[usize],
        unique: bool,
    ) -> Result<TableIndex, ComposeError> {
        let label = format!("{}.{name}", table.name);
        self.check_width(&label, columns.len())?;
        let hkey = self.hkey(table.id, &label)?;

        let mut sources = columns
            .iter()
            .map(|&pos| {
                table
                    .column_at(pos)
                    .map(|_| RowSource::Field {
                        column: table.column_ref(pos),
                        field: pos,
                    })
                    .ok_or_else(|| ComposeError::UnknownColumn {
                        index: label.clone(),
                        column: table.column_ref(pos).to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let declared = sources.len();

        for hc in hkey.columns() {
            let source = if hc.column.table == table.id {
                RowSource::Field {
                    column: hc.column,
                    field: hc.column.position,
                }
            } else {
                RowSource::InheritedHKey(hc.position)
            };
            if !covers(&sources, &source) {
                sources.push(source);
            }
        }

        let composition = IndexRowComposition::new(sources, declared);
        let to_hkey = recipe(hkey, &label, |hc| {
            composition.position_of(hc.column).or_else(|| {
                composition
                    .sources()
                    .iter()
                    .position(|s| *s == RowSource::InheritedHKey(hc.position))
            })
        })?;

        Ok(TableIndex {
            name: name.to_string(),
            table: table.id,
            columns: columns.to_vec(),
            unique,
            composition,
            to_hkey,
        })
    }

    fn group_index(&self, def: &GroupIndexDef) -> Result<GroupIndex, ComposeError> {
        let label = def.name.as_str();
        if def.columns.is_empty() {
            return Err(ComposeError::EmptyIndex {
                index: label.to_string(),
            });
        }
        self.check_width(label, def.columns.len())?;
        if def.root != self.membership.root() {
            return Err(self.outside(label, def.root));
        }

        // Participating tables, deepest and shallowest.
        let mut leaf = None::<(usize, TableId)>;
        let mut top = None::<(usize, TableId)>;
        for column in &def.columns {
            let depth = self
                .membership
                .depth(column.table)
                .ok_or_else(|| self.outside(label, column.table))?;
            if self.schema.column(*column).is_none() {
                return Err(ComposeError::UnknownColumn {
                    index: label.to_string(),
                    column: self.schema.column_label(*column),
                });
            }
            if leaf.is_none_or(|(d, _)| depth > d) {
                leaf = Some((depth, column.table));
            }
            if top.is_none_or(|(d, _)| depth < d) {
                top = Some((depth, column.table));
            }
        }
        let (Some((leaf_depth, leafmost)), Some((root_depth, rootmost))) = (leaf, top) else {
            return Err(ComposeError::EmptyIndex {
                index: label.to_string(),
            });
        };

        for column in &def.columns {
            if !self.membership.is_ancestor_or_self(column.table, leafmost) {
                return Err(ComposeError::BranchingGroupIndex {
                    index: label.to_string(),
                    table: self.table_label(column.table),
                });
            }
        }

        let leaf_hkey = self.hkey(leafmost, label)?;

        let mut sources = Vec::with_capacity(def.columns.len() + leaf_hkey.len());
        for column in &def.columns {
            sources.push(self.layout_field(label, *column)?);
        }
        let declared = sources.len();

        for hc in leaf_hkey.columns() {
            let chosen = self.undeclared_column(hc, def.join_type, root_depth, leaf_depth);
            let source = self.layout_field(label, chosen)?;
            if !covers(&sources, &source) {
                sources.push(source);
            }
        }
        let composition = IndexRowComposition::new(sources, declared);

        // One recipe per branch table, root first.
        let mut recipes = Vec::with_capacity(leaf_depth + 1);
        for table in self.membership.path(leafmost) {
            let hkey = self.hkey(table, label)?;
            recipes.push(recipe(hkey, label, |hc| {
                composition.position_of(hc.column).or_else(|| {
                    let equivalents = leaf_hkey
                        .column_at(hc.position)
                        .map_or(hc.equivalents.as_slice(), |l| l.equivalents.as_slice());
                    self.substitute(&composition, hc, equivalents, def.join_type, root_depth)
                })
            })?);
        }
        let to_hkey = recipes.pop().unwrap_or_default();

        Ok(GroupIndex {
            name: def.name.clone(),
            root: def.root,
            columns: def.columns.clone(),
            unique: def.unique,
            join_type: def.join_type,
            rootmost,
            leafmost,
            composition,
            to_hkey,
            ancestor_to_hkeys: recipes,
        })
    }

    // LEFT leans rootward but not above the rootmost table; RIGHT leans
    // leafward but not below the leafmost table.
    fn undeclared_column(
        &self,
        hc: &HKeyColumn,
        join_type: JoinType,
        root_depth: usize,
        leaf_depth: usize,
    ) -> ColumnRef {
        let depth = |c: &&ColumnRef| self.membership.depth(c.table);

        match join_type {
            JoinType::Left => hc
                .equivalents
                .iter()
                .find(|c| depth(c).is_some_and(|d| d >= root_depth)),
            JoinType::Right => hc
                .equivalents
                .iter()
                .rev()
                .find(|c| depth(c).is_some_and(|d| d <= leaf_depth)),
        }
        .copied()
        .unwrap_or(hc.column)
    }

    // Pick an equivalent column stored in the index row for an hkey column
    // that is not stored itself. Above the rootmost table any stored
    // equivalent works (rootmost first); otherwise LEFT takes the nearest
    // rootward one and RIGHT the nearest leafward one.
    fn substitute(
        &self,
        composition: &IndexRowComposition,
        hc: &HKeyColumn,
        equivalents: &[ColumnRef],
        join_type: JoinType,
        root_depth: usize,
    ) -> Option<usize> {
        let target = self.membership.depth(hc.column.table)?;
        let depth = |c: &&ColumnRef| self.membership.depth(c.table);
        let stored = |c: &ColumnRef| composition.position_of(*c);

        if target < root_depth {
            return equivalents.iter().find_map(stored);
        }

        match join_type {
            JoinType::Left => equivalents
                .iter()
                .filter(|c| depth(c).is_some_and(|d| d < target))
                .filter_map(stored)
                .last(),
            JoinType::Right => equivalents
                .iter()
                .rev()
                .filter(|c| depth(c).is_some_and(|d| d > target))
                .filter_map(stored)
                .last(),
        }
    }

    fn layout_field(&self, label: &str, column: ColumnRef) -> Result<RowSource, ComposeError> {
        self.layout
            .field_of(column)
            .map(|field| RowSource::Field { column, field })
            .ok_or_else(|| self.outside(label, column.table))
    }

    fn hkey(&self, table: TableId, label: &str) -> Result<&'a HKey, ComposeError> {
        self.hkeys
            .get(&table)
            .ok_or_else(|| self.outside(label, table))
    }

    fn check_width(&self, label: &str, columns: usize) -> Result<(), ComposeError> {
        if columns > self.max_index_columns {
            return Err(ComposeError::TooManyColumns {
                index: label.to_string(),
                columns,
                max: self.max_index_columns,
            });
        }

        Ok(())
    }

    fn outside(&self, label: &str, table: TableId) -> ComposeError {
        ComposeError::OutsideGroup {
            index: label.to_string(),
            table: self.table_label(table),
        }
    }

    fn table_label(&self, table: TableId) -> String {
        self.schema
            .table(table)
            .map_or_else(|| table.to_string(), |t| t.name.to_string())
    }
}

// True when `source` is already stored; field sources match on column identity.
fn covers(sources: &[RowSource], source: &RowSource) -> bool {
    sources.iter().any(|s| match (s, source) {
        (RowSource::Field { column: a, .. }, RowSource::Field { column: b, .. }) => a == b,
        _ => s == source,
    })
}

fn recipe(
    hkey: &HKey,
    label: &str,
    mut locate: impl FnMut(&HKeyColumn) -> Option<usize>,
) -> Result<IndexToHKey, ComposeError> {
    hkey.slots()
        .map(|slot| match slot {
            HKeySlot::Ordinal(segment) => Ok(HKeyEntry::Ordinal(segment.ordinal)),
            HKeySlot::Column(hc) => locate(hc).map(HKeyEntry::IndexRow).ok_or_else(|| {
                ComposeError::Coverage {
                    index: label.to_string(),
                    position: hc.position,
                }
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(IndexToHKey::new)
}
