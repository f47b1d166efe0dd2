use crate::{
    PRIMARY_INDEX_NAME,
    build::{PendingGroupIndex, PendingIndex},
    error::{ErrorTree, SchemaError},
    node::{ColumnRef, GroupIndexDef, Table, TableIndexDef, TableName},
    validate::{join::lookup, naming},
};
use std::collections::BTreeMap;

/// Resolve the secondary indexes declared on one table.
pub(crate) fn resolve_table_indexes(
    table: &Table,
    pending: &[PendingIndex],
    errs: &mut ErrorTree,
) -> Vec<TableIndexDef> {
    let owner = table.name.to_string();

    let names = pending
        .iter()
        .map(|i| i.name.as_str())
        .chain(std::iter::once(PRIMARY_INDEX_NAME));
    for dup in naming::duplicates(names) {
        errs.add(SchemaError::DuplicateIndex {
            owner: owner.clone(),
            index: dup.to_string(),
        });
    }

    let mut indexes = Vec::with_capacity(pending.len());
    for index in pending {
        if let Err(e) = naming::validate_ident(&index.name) {
            errs.add(e);
        }
        if index.columns.is_empty() {
            errs.add(SchemaError::EmptyIndex {
                owner: owner.clone(),
                index: index.name.clone(),
            });
            continue;
        }

        let columns: Vec<_> = index
            .columns
            .iter()
            .map(|c| lookup(table, c, errs))
            .collect();
        if let Some(columns) = columns.into_iter().collect::<Option<Vec<_>>>() {
            indexes.push(TableIndexDef {
                name: index.name.clone(),
                columns,
                unique: index.unique,
            });
        }
    }

    indexes
}

/// Resolve group index declarations to table ids and column positions.
///
/// Whether the referenced tables really share the named group is a
/// group-level question answered by the compiler.
pub(crate) fn resolve_group_indexes(
    pending: &[PendingGroupIndex],
    tables: &[Table],
    by_name: &BTreeMap<TableName, usize>,
    errs: &mut ErrorTree,
) -> Vec<GroupIndexDef> {
    let mut seen: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for index in pending {
        seen.entry(index.root.as_str())
            .or_default()
            .push(index.name.as_str());
    }
    for (root, names) in seen {
        for dup in naming::duplicates(names) {
            errs.add(SchemaError::DuplicateIndex {
                owner: root.to_string(),
                index: dup.to_string(),
            });
        }
    }

    let resolve_table = |name: &str, errs: &mut ErrorTree| {
        let found = TableName::try_from(name.to_string())
            .ok()
            .and_then(|n| by_name.get(&n))
            .map(|&i| &tables[i]);
        if found.is_none() {
            errs.add(SchemaError::UnknownTable {
                table: name.to_string(),
            });
        }
        found
    };

    let mut indexes = Vec::with_capacity(pending.len());
    for index in pending {
        if let Err(e) = naming::validate_ident(&index.name) {
            errs.add(e);
        }
        let root = resolve_table(&index.root, errs);
        if index.columns.is_empty() {
            errs.add(SchemaError::EmptyIndex {
                owner: index.root.clone(),
                index: index.name.clone(),
            });
            continue;
        }

        let mut columns = Vec::with_capacity(index.columns.len());
        let mut complete = true;
        for (table, column) in &index.columns {
            let resolved = resolve_table(table, errs)
                .and_then(|t| lookup(t, column, errs).map(|pos| ColumnRef::new(t.id, pos)));
            match resolved {
                Some(c) => columns.push(c),
                None => complete = false,
            }
        }

        if let (Some(root), true) = (root, complete) {
            indexes.push(GroupIndexDef {
                name: index.name.clone(),
                root: root.id,
                columns,
                unique: index.unique,
                join_type: index.join_type,
            });
        }
    }

    indexes
}
