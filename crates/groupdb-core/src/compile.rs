//! Group compilation pipeline.
//!
//! grouping -> ordinals -> hkeys -> row layout -> indexes, all in local
//! state. A group either compiles completely or not at all.


use crate::{
    error::{CompileError, GroupError},
    group::{self, GroupMembership, GroupRowLayout},
    hkey::{HKey, HKeyBuilder},
    index::{CompiledIndex, IndexComposer, IndexTarget},
    obs::sink::{self, MetricsEvent},
    ordinal::{GroupOrdinals, Ordinal, OrdinalAssigner},
};
use groupdb_config::CompilerConfig;
use groupdb_schema::node::{Schema, TableId, TableName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

///
/// CompiledTable
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CompiledTable {
    pub table: TableId,
    pub name: TableName,
    pub parent: Option<TableId>,
    pub depth: usize,
    pub ordinal: Ordinal,
    pub hkey: HKey,
    pub primary: CompiledIndex,
    pub indexes: Vec<CompiledIndex>,
}

///
/// CompiledGroup
/// Published physical metadata of one group.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CompiledGroup {
    name: TableName,
    root: TableId,
    ordinals: GroupOrdinals,
    layout: GroupRowLayout,

    /// Members in group preorder.
    tables: Vec<CompiledTable>,
    group_indexes: Vec<CompiledIndex>,
}

impl CompiledGroup {
    #[must_use]
    pub const fn name(&self) -> &TableName {
        &self.name
    }

    #[must_use]
    pub const fn root(&self) -> TableId {
        self.root
    }

    /// Ordinal state to feed into the next compilation of this group.
    #[must_use]
    pub const fn ordinals(&self) -> &GroupOrdinals {
        &self.ordinals
    }

    #[must_use]
    pub const fn layout(&self) -> &GroupRowLayout {
        &self.layout
    }

    #[must_use]
    pub fn tables(&self) -> &[CompiledTable] {
        &self.tables
    }

    #[must_use]
    pub fn table(&self, table: TableId) -> Option<&CompiledTable> {
        self.tables.iter().find(|t| t.table == table)
    }

    #[must_use]
    pub fn table_by_name(&self, name: &TableName) -> Option<&CompiledTable> {
        self.tables.iter().find(|t| &t.name == name)
    }

    #[must_use]
    pub fn contains(&self, table: TableId) -> bool {
        self.table(table).is_some()
    }

    #[must_use]
    pub fn ordinal(&self, table: TableId) -> Option<Ordinal> {
        self.table(table).map(|t| t.ordinal)
    }

    #[must_use]
    pub fn hkey(&self, table: TableId) -> Option<&HKey> {
        self.table(table).map(|t| &t.hkey)
    }

    #[must_use]
    pub fn primary_index(&self, table: TableId) -> Option<&CompiledIndex> {
        self.table(table).map(|t| &t.primary)
    }

    /// Secondary indexes of one table, in declaration order.
    #[must_use]
    pub fn table_indexes(&self, table: TableId) -> &[CompiledIndex] {
        self.table(table).map_or(&[], |t| t.indexes.as_slice())
    }

    /// A table's index by name; `PRIMARY` names its primary index.
    #[must_use]
    pub fn table_index(&self, table: TableId, name: &str) -> Option<&CompiledIndex> {
        let t = self.table(table)?;

        std::iter::once(&t.primary)
            .chain(&t.indexes)
            .find(|i| i.name() == name)
    }

    /// Group index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&CompiledIndex> {
        self.group_indexes.iter().find(|i| i.name() == name)
    }

    #[must_use]
    pub fn group_indexes(&self) -> &[CompiledIndex] {
        &self.group_indexes
    }

    /// Total compiled indexes, primary ones included.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.tables.iter().map(|t| 1 + t.indexes.len()).sum::<usize>() + self.group_indexes.len()
    }
}

///
/// Compiler
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Compiler {
    assigner: OrdinalAssigner,
    max_index_columns: usize,
}

impl Compiler {
    #[must_use]
    pub const fn new(config: &CompilerConfig) -> Self {
        Self {
            assigner: OrdinalAssigner::new(config.ordinal_base, config.max_ordinal),
            max_index_columns: config.max_index_columns,
        }
    }

    /// Compile the group rooted at `root`, continuing from `previous` ordinals.
    pub fn compile_group(
        &self,
        schema: &Schema,
        root: TableId,
        previous: &GroupOrdinals,
    ) -> Result<CompiledGroup, CompileError> {
        let label = schema
            .table(root)
            .map_or_else(|| root.to_string(), |t| t.name.to_string());
        sink::record(MetricsEvent::CompileStart { group: &label });

        let result = self.compile_group_inner(schema, root, previous);
        match &result {
            Ok(group) => {
                sink::record(MetricsEvent::GroupCompiled {
                    group: &label,
                    tables: group.tables.len() as u64,
                    indexes: group.index_count() as u64,
                    ordinals_issued: issued(previous, &group.ordinals),
                    ordinals_retired: retired(previous, &group.ordinals),
                });
                info!(
                    group = %label,
                    tables = group.tables.len(),
                    indexes = group.index_count(),
                    "group compiled"
                );
            }
            Err(err) => {
                sink::record(MetricsEvent::CompileRejected {
                    group: &label,
                    class: err.class(),
                });
                debug!(group = %label, error = %err, "group compilation failed");
            }
        }

        result
    }

    /// Compile every group of the schema.
    ///
    /// `previous` holds ordinal state keyed by group (root table) name;
    /// groups without an entry start fresh.
    pub fn compile(
        &self,
        schema: &Schema,
        previous: &BTreeMap<TableName, GroupOrdinals>,
    ) -> Result<BTreeMap<TableName, CompiledGroup>, CompileError> {
        let groups = group::discover(schema)?;

        for index in schema.group_indexes() {
            if let Some(table) = schema.table(index.root).filter(|t| !t.is_root()) {
                return Err(GroupError::NotARoot {
                    table: table.name.to_string(),
                }
                .into());
            }
        }

        let empty = GroupOrdinals::default();
        groups
            .iter()
            .map(|membership| {
                let previous = previous.get(membership.name()).unwrap_or(&empty);
                self.compile_group(schema, membership.root(), previous)
                    .map(|group| (membership.name().clone(), group))
            })
            .collect()
    }

    fn compile_group_inner(
        &self,
        schema: &Schema,
        root: TableId,
        previous: &GroupOrdinals,
    ) -> Result<CompiledGroup, CompileError> {
        let membership = GroupMembership::of_root(schema, root)?;
        let ordinals = self.assigner.assign(schema, &membership, previous)?;
        let hkeys = HKeyBuilder::new(schema).build_group(&membership, &ordinals)?;
        let layout = GroupRowLayout::assemble(schema, &membership);
        let composer = IndexComposer::new(
            schema,
            &membership,
            &hkeys,
            &layout,
            self.max_index_columns,
        );

        let mut tables = Vec::with_capacity(membership.len());
        for member in membership.members() {
            let missing = || GroupError::UnknownTable {
                table: member.table.to_string(),
            };
            let table = schema.table(member.table).ok_or_else(missing)?;
            let hkey = hkeys.get(&member.table).cloned().ok_or_else(missing)?;
            let ordinal = ordinals.get(&table.name).ok_or_else(missing)?;

            let primary = composer.compose(IndexTarget::Primary { table })?;
            let indexes = table
                .indexes
                .iter()
                .map(|index| composer.compose(IndexTarget::Table { table, index }))
                .collect::<Result<Vec<_>, _>>()?;

            tables.push(CompiledTable {
                table: table.id,
                name: table.name.clone(),
                parent: member.parent,
                depth: member.depth,
                ordinal,
                hkey,
                primary,
                indexes,
            });
        }

        let group_indexes = schema
            .group_indexes_for(root)
            .map(|index| composer.compose(IndexTarget::Group { index }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledGroup {
            name: membership.name().clone(),
            root,
            ordinals,
            layout,
            tables,
            group_indexes,
        })
    }
}

fn issued(previous: &GroupOrdinals, next: &GroupOrdinals) -> u64 {
    next.assigned()
        .keys()
        .filter(|name| previous.get(name).is_none())
        .count() as u64
}

fn retired(previous: &GroupOrdinals, next: &GroupOrdinals) -> u64 {
    next.retired().len().saturating_sub(previous.retired().len()) as u64
}
