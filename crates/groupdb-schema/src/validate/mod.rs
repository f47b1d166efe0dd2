//! Build-time resolution and validation of schema declarations.
//!
//! Runs in staged order: tables and columns, primary keys (with surrogate
//! assignment), parent joins, then indexes. Group-level consistency (a
//! single root per group, group index branches) is left to the compiler.

pub(crate) mod index;
pub(crate) mod join;
pub(crate) mod naming;

use crate::{
    SURROGATE_COLUMN_TYPE,
    build::{PendingGroupIndex, PendingTable},
    error::{ErrorTree, SchemaError},
    node::{Column, PrimaryKey, PrimaryKeySource, Schema, Table, TableId, TableName},
};
use std::collections::BTreeMap;

/// Resolve raw declarations into a [`Schema`], collecting every error.
pub(crate) fn resolve_schema(
    pending: &[PendingTable],
    group_indexes: &[PendingGroupIndex],
    surrogate_column: &str,
) -> Result<Schema, ErrorTree> {
    let mut errs = ErrorTree::new();
    if let Err(e) = naming::validate_ident(surrogate_column) {
        errs.add(e);
    }

    // Phase 1: tables, columns and primary keys.
    let mut tables = Vec::with_capacity(pending.len());
    let mut sources = Vec::with_capacity(pending.len());
    let mut by_name = BTreeMap::new();

    for decl in pending {
        let name = TableName::new(decl.schema.as_str(), decl.name.as_str());
        for ident in [&decl.schema, &decl.name] {
            if let Err(e) = naming::validate_ident(ident) {
                errs.add(e);
            }
        }
        if by_name.contains_key(&name) {
            errs.add(SchemaError::DuplicateTable {
                table: name.to_string(),
            });
            continue;
        }

        #[expect(clippy::cast_possible_truncation)]
        let id = TableId(tables.len() as u32);
        let table = resolve_table(id, name.clone(), decl, surrogate_column, &mut errs);
        by_name.insert(name, tables.len());
        tables.push(table);
        sources.push(decl);
    }

    // Phase 2: parent joins, resolved against fully built tables.
    let joins: Vec<_> = tables
        .iter()
        .zip(&sources)
        .map(|(table, decl)| {
            join::resolve_parent_join(table, &decl.joins, &tables, &by_name, &mut errs)
        })
        .collect();
    for (table, join) in tables.iter_mut().zip(joins) {
        table.parent_join = join;
    }

    // Phase 3: indexes.
    for (table, decl) in tables.iter_mut().zip(&sources) {
        table.indexes = index::resolve_table_indexes(table, &decl.indexes, &mut errs);
    }
    let group_indexes = index::resolve_group_indexes(group_indexes, &tables, &by_name, &mut errs);

    errs.result()?;

    Ok(Schema {
        tables,
        group_indexes,
    })
}

// Build one table's row layout and primary key.
fn resolve_table(
    id: TableId,
    name: TableName,
    decl: &PendingTable,
    surrogate_column: &str,
    errs: &mut ErrorTree,
) -> Table {
    let mut columns: Vec<Column> = decl
        .columns
        .iter()
        .enumerate()
        .map(|(position, c)| Column {
            name: c.name.clone(),
            position,
            ty: c.ty.clone(),
            nullable: c.nullable,
            internal: false,
        })
        .collect();

    for column in &columns {
        if let Err(e) = naming::validate_ident(&column.name) {
            errs.add(e);
        }
    }
    for dup in naming::duplicates(columns.iter().map(|c| c.name.as_str())) {
        errs.add(SchemaError::DuplicateColumn {
            table: name.to_string(),
            column: dup.to_string(),
        });
    }

    let primary_key = match &decl.primary_key {
        Some(key) => resolve_declared_key(&name, &columns, key, errs),
        None => {
            if columns.iter().any(|c| c.name == surrogate_column) {
                errs.add(SchemaError::SurrogateColumnClash {
                    table: name.to_string(),
                    column: surrogate_column.to_string(),
                });
            }
            let position = columns.len();
            columns.push(Column {
                name: surrogate_column.to_string(),
                position,
                ty: SURROGATE_COLUMN_TYPE.to_string(),
                nullable: false,
                internal: true,
            });

            PrimaryKey {
                columns: vec![position],
                source: PrimaryKeySource::Surrogate,
            }
        }
    };

    Table {
        id,
        name,
        columns,
        primary_key,
        parent_join: None,
        indexes: Vec::new(),
    }
}

fn resolve_declared_key(
    table: &TableName,
    columns: &[Column],
    key: &[String],
    errs: &mut ErrorTree,
) -> PrimaryKey {
    if key.is_empty() {
        errs.add(SchemaError::EmptyPrimaryKey {
            table: table.to_string(),
        });
    }
    for dup in naming::duplicates(key.iter().map(String::as_str)) {
        errs.add(SchemaError::DuplicateKeyColumn {
            table: table.to_string(),
            column: dup.to_string(),
        });
    }

    let positions = key
        .iter()
        .filter_map(|name| {
            let found = columns.iter().find(|c| &c.name == name).map(|c| c.position);
            if found.is_none() {
                errs.add(SchemaError::UnknownColumn {
                    table: table.to_string(),
                    column: name.clone(),
                });
            }
            found
        })
        .collect();

    PrimaryKey {
        columns: positions,
        source: PrimaryKeySource::Declared,
    }
}
