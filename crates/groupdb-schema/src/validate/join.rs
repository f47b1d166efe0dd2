use crate::{
    build::PendingJoin,
    error::{ErrorTree, SchemaError},
    node::{JoinColumn, ParentJoin, Table, TableName},
};
use std::collections::BTreeMap;

/// Resolve the (at most one) grouping join declared on `child`.
///
/// The parent must already be resolved with a declared primary key, and the
/// join's parent columns must be exactly that key, in key order.
pub(crate) fn resolve_parent_join(
    child: &Table,
    joins: &[PendingJoin],
    tables: &[Table],
    by_name: &BTreeMap<TableName, usize>,
    errs: &mut ErrorTree,
) -> Option<ParentJoin> {
    if joins.len() > 1 {
        errs.add(SchemaError::MultipleParentJoins {
            table: child.name.to_string(),
        });
        return None;
    }
    let join = joins.first()?;

    let parent_name = qualify(&child.name, &join.parent);
    let join_name = format!("{parent_name}/{}", child.name);

    let Some(parent) = by_name.get(&parent_name).map(|&i| &tables[i]) else {
        errs.add(SchemaError::UnknownTable {
            table: parent_name.to_string(),
        });
        return None;
    };
    if parent.id == child.id {
        errs.add(SchemaError::SelfJoin {
            table: child.name.to_string(),
        });
        return None;
    }
    let Some(parent_key) = parent.declared_primary_key() else {
        errs.add(SchemaError::ParentWithoutPrimaryKey {
            join: join_name,
            parent: parent.name.to_string(),
        });
        return None;
    };
    if parent_key.columns.len() != join.pairs.len() {
        errs.add(SchemaError::JoinArityMismatch {
            join: join_name,
            parent_key: parent_key.columns.len(),
            join_columns: join.pairs.len(),
        });
        return None;
    }

    let before = errs.len();
    let mut columns = Vec::with_capacity(join.pairs.len());

    for (position, (child_col, parent_col)) in join.pairs.iter().enumerate() {
        let child_pos = lookup(child, child_col, errs);
        let parent_pos = lookup(parent, parent_col, errs);

        if let (Some(child_pos), Some(parent_pos)) = (child_pos, parent_pos) {
            let expected = parent_key.columns[position];
            if parent_pos != expected {
                errs.add(SchemaError::JoinColumnMismatch {
                    join: join_name.clone(),
                    position,
                    expected: parent.columns[expected].name.clone(),
                    found: parent_col.clone(),
                });
            }
            columns.push(JoinColumn {
                parent: parent_pos,
                child: child_pos,
            });
        }
    }

    (errs.len() == before).then(|| ParentJoin {
        name: join_name,
        parent: parent.id,
        columns,
    })
}

pub(crate) fn qualify(context: &TableName, name: &str) -> TableName {
    TableName::try_from(name.to_string()).unwrap_or_else(|_| TableName::new(context.schema(), name))
}

pub(crate) fn lookup(table: &Table, column: &str, errs: &mut ErrorTree) -> Option<usize> {
    let found = table.column(column).map(|c| c.position);
    if found.is_none() {
        errs.add(SchemaError::UnknownColumn {
            table: table.name.to_string(),
            column: column.to_string(),
        });
    }

    found
}
