//! Publication of compiled metadata.
//!
//! Readers take `Arc` snapshots and never observe a half-compiled group.
//! Writers are serialized by the ordinal lock, which is held across the
//! whole recompilation.


use crate::{
    compile::{CompiledGroup, Compiler},
    error::{CompileError, GroupError},
    obs::sink::{self, MetricsEvent},
    ordinal::GroupOrdinals,
};
use groupdb_schema::node::{Schema, TableName};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{info, warn};

///
/// Catalog
///

#[derive(Debug)]
pub struct Catalog {
    compiler: Compiler,
    groups: RwLock<BTreeMap<TableName, Arc<CompiledGroup>>>,
    ordinals: RwLock<BTreeMap<TableName, GroupOrdinals>>,
}

impl Catalog {
    #[must_use]
    pub const fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            groups: RwLock::new(BTreeMap::new()),
            ordinals: RwLock::new(BTreeMap::new()),
        }
    }

    /// Start from ordinal state persisted by an earlier process.
    #[must_use]
    pub const fn with_ordinals(
        compiler: Compiler,
        ordinals: BTreeMap<TableName, GroupOrdinals>,
    ) -> Self {
        Self {
            compiler,
            groups: RwLock::new(BTreeMap::new()),
            ordinals: RwLock::new(ordinals),
        }
    }

    /// Recompile the group rooted at `root` and publish it.
    ///
    /// On failure the previously published snapshot and ordinal state stay
    /// exactly as they were.
    pub fn recompile(
        &self,
        schema: &Schema,
        root: &TableName,
    ) -> Result<Arc<CompiledGroup>, CompileError> {
        let table = schema
            .table_by_name(root)
            .ok_or_else(|| GroupError::UnknownTable {
                table: root.to_string(),
            })?;

        let mut ordinals = self.ordinals.write().unwrap_or_else(PoisonError::into_inner);
        let previous = ordinals.get(root).cloned().unwrap_or_default();

        let compiled = match self.compiler.compile_group(schema, table.id, &previous) {
            Ok(compiled) => Arc::new(compiled),
            Err(err) => {
                warn!(group = %root, error = %err, class = %err.class(), "recompile rejected");
                return Err(err);
            }
        };

        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(root.clone(), Arc::clone(&compiled));
        ordinals.insert(root.clone(), compiled.ordinals().clone());
        drop(ordinals);

        sink::record(MetricsEvent::SnapshotPublished {
            group: &root.to_string(),
        });
        info!(group = %root, "group published");

        Ok(compiled)
    }

    /// Recompile every group of the schema, one group at a time.
    ///
    /// Groups are published independently; the first failing group stops
    /// the pass and keeps its old snapshot. Once every group has been
    /// published, groups whose root no longer heads a group are dropped.
    pub fn recompile_all(&self, schema: &Schema) -> Result<Vec<Arc<CompiledGroup>>, CompileError> {
        let memberships = crate::group::discover(schema)?;
        let live: BTreeSet<&TableName> = memberships.iter().map(|m| m.name()).collect();

        let compiled = memberships
            .iter()
            .map(|membership| self.recompile(schema, membership.name()))
            .collect::<Result<Vec<_>, _>>()?;

        for stale in self.group_names() {
            if !live.contains(&stale) {
                self.drop_group(&stale);
            }
        }

        Ok(compiled)
    }

    /// Latest published snapshot of a group.
    #[must_use]
    pub fn group(&self, root: &TableName) -> Option<Arc<CompiledGroup>> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(root)
            .cloned()
    }

    /// Snapshot of the group a table belongs to.
    #[must_use]
    pub fn group_of(&self, table: &TableName) -> Option<Arc<CompiledGroup>> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|g| g.table_by_name(table).is_some())
            .cloned()
    }

    /// Names of every published group.
    #[must_use]
    pub fn group_names(&self) -> Vec<TableName> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Ordinal state recorded for a group.
    #[must_use]
    pub fn ordinals(&self, root: &TableName) -> Option<GroupOrdinals> {
        self.ordinals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(root)
            .cloned()
    }

    /// Unpublish a group. Its ordinals are retired rather than forgotten,
    /// so tables recreated under the same names get fresh ones.
    pub fn drop_group(&self, root: &TableName) -> Option<Arc<CompiledGroup>> {
        // same lock order as recompile: ordinals, then groups
        let mut ordinals = self.ordinals.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(state) = ordinals.get_mut(root) {
            state.retire_all();
        }

        let dropped = self
            .groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(root);
        drop(ordinals);

        if dropped.is_some() {
            sink::record(MetricsEvent::SnapshotDropped {
                group: &root.to_string(),
            });
            info!(group = %root, "group dropped");
        }

        dropped
    }
}
