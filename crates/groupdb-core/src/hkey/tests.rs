use super::*;
use crate::{
    group::GroupMembership,
    ordinal::{GroupOrdinals, OrdinalAssigner},
    test_fixtures::{cascading, col, id, non_cascading},
};
use groupdb_schema::{build::SchemaBuilder, node::Schema};
use std::collections::BTreeMap;

fn hkeys(schema: &Schema, root: &str) -> BTreeMap<TableId, HKey> {
    let membership = GroupMembership::of_root(schema, id(schema, root)).unwrap();
    let ordinals = OrdinalAssigner::new(1, 100)
        .assign(schema, &membership, &GroupOrdinals::default())
        .unwrap();

    HKeyBuilder::new(schema)
        .build_group(&membership, &ordinals)
        .unwrap()
}

// (segment table, [(column table, column name)]) per segment
fn shape(schema: &Schema, hkey: &HKey) -> Vec<(String, Vec<String>)> {
    hkey.segments
        .iter()
        .map(|s| {
            let table = schema.table(s.table).unwrap().name.name().to_string();
            let columns = s
                .columns
                .iter()
                .map(|c| {
                    let owner = schema.table(c.column.table).unwrap();
                    format!("{}.{}", owner.name.name(), owner.columns[c.column.position].name)
                })
                .collect();
            (table, columns)
        })
        .collect()
}

fn seg(table: &str, columns: &[&str]) -> (String, Vec<String>) {
    (
        table.to_string(),
        columns.iter().map(|c| (*c).to_string()).collect(),
    )
}

#[test]
fn root_hkey_is_ordinal_then_key() {
    let schema = SchemaBuilder::new("s")
        .table("customer")
        .column("cid", "INT", false)
        .column("cx", "INT", true)
        .primary_key(&["cid"])
        .build()
        .unwrap();
    let hkeys = hkeys(&schema, "customer");
    let hkey = &hkeys[&id(&schema, "customer")];

    assert_eq!(hkey.len(), 2);
    assert_eq!(shape(&schema, hkey), vec![seg("customer", &["customer.cid"])]);
    assert_eq!(hkey.segments[0].ordinal, Ordinal(1));
    assert_eq!(hkey.segments[0].position, 0);
    assert_eq!(hkey.segments[0].columns[0].position, 1);
}

#[test]
fn root_key_keeps_declared_order() {
    let schema = SchemaBuilder::new("s")
        .table("t")
        .column("a", "INT", true)
        .column("b", "INT", true)
        .column("c", "INT", true)
        .column("d", "INT", false)
        .column("e", "INT", false)
        .primary_key(&["e", "d"])
        .build()
        .unwrap();
    let hkeys = hkeys(&schema, "t");

    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "t")]),
        vec![seg("t", &["t.e", "t.d"])]
    );
}

#[test]
fn non_cascading_chain_points_at_deepest_equivalent() {
    let schema = non_cascading();
    let hkeys = hkeys(&schema, "customer");

    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "orders")]),
        vec![seg("customer", &["orders.cid"]), seg("orders", &["orders.oid"])]
    );
    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "item")]),
        vec![
            seg("customer", &["orders.cid"]),
            seg("orders", &["item.oid"]),
            seg("item", &["item.iid"]),
        ]
    );
    assert_eq!(hkeys[&id(&schema, "orders")].len(), 4);
    assert_eq!(hkeys[&id(&schema, "item")].len(), 6);
}

#[test]
fn cascading_chain_elides_shared_prefix() {
    let schema = cascading();
    let hkeys = hkeys(&schema, "customer");

    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "orders")]),
        vec![seg("customer", &["orders.cid"]), seg("orders", &["orders.oid"])]
    );
    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "item")]),
        vec![
            seg("customer", &["item.cid"]),
            seg("orders", &["item.oid"]),
            seg("item", &["item.iid"]),
        ]
    );
}

#[test]
fn equivalents_run_root_first() {
    let schema = cascading();
    let hkeys = hkeys(&schema, "customer");
    let item = &hkeys[&id(&schema, "item")];

    assert_eq!(
        item.column_at(1).unwrap().equivalents,
        vec![
            col(&schema, "customer", "cid"),
            col(&schema, "orders", "cid"),
            col(&schema, "item", "cid"),
        ]
    );
    assert_eq!(
        item.column_at(3).unwrap().equivalents,
        vec![col(&schema, "orders", "oid"), col(&schema, "item", "oid")]
    );
    for hc in item.columns() {
        assert_eq!(hc.equivalents.last(), Some(&hc.column));
    }
}

#[test]
fn child_keyed_by_join_contributes_no_columns() {
    let schema = SchemaBuilder::new("s")
        .table("parent")
        .column("id", "INT", false)
        .primary_key(&["id"])
        .table("child")
        .column("id", "INT", false)
        .primary_key(&["id"])
        .join("parent", &[("id", "id")])
        .build()
        .unwrap();
    let hkeys = hkeys(&schema, "parent");
    let child = &hkeys[&id(&schema, "child")];

    assert_eq!(
        shape(&schema, child),
        vec![seg("parent", &["child.id"]), seg("child", &[])]
    );
    assert_eq!(child.len(), 3);
}

#[test]
fn elision_stops_at_first_mismatch() {
    let schema = SchemaBuilder::new("s")
        .table("b")
        .column("b0", "INT", true)
        .column("b1", "INT", false)
        .column("b2", "INT", false)
        .column("b3", "INT", false)
        .column("b4", "INT", false)
        .column("b5", "INT", true)
        .primary_key(&["b3", "b2", "b4", "b1"])
        .table("bb")
        .column("bb0", "INT", false)
        .column("bb1", "INT", true)
        .column("bb2", "INT", false)
        .column("bb3", "INT", false)
        .column("bb4", "INT", false)
        .column("bb5", "INT", false)
        .primary_key(&["bb0", "bb5", "bb3", "bb2", "bb4"])
        .join("b", &[("bb0", "b3"), ("bb2", "b2"), ("bb1", "b4"), ("bb3", "b1")])
        .build()
        .unwrap();
    let hkeys = hkeys(&schema, "b");

    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "b")]),
        vec![seg("b", &["b.b3", "b.b2", "b.b4", "b.b1"])]
    );
    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "bb")]),
        vec![
            seg("b", &["bb.bb0", "bb.bb2", "bb.bb1", "bb.bb3"]),
            seg("bb", &["bb.bb5", "bb.bb3", "bb.bb2", "bb.bb4"]),
        ]
    );
    assert_eq!(hkeys[&id(&schema, "bb")].len(), 10);
}

#[test]
fn surrogate_key_contributes_one_column() {
    let schema = SchemaBuilder::new("s")
        .table("p")
        .column("pid", "INT", false)
        .primary_key(&["pid"])
        .table("log")
        .column("pid", "INT", false)
        .column("msg", "TEXT", true)
        .join("p", &[("pid", "pid")])
        .build()
        .unwrap();
    let hkeys = hkeys(&schema, "p");
    let log = &hkeys[&id(&schema, "log")];

    assert_eq!(
        shape(&schema, log),
        vec![seg("p", &["log.pid"]), seg("log", &["log.__row_id"])]
    );
    assert_eq!(new_columns(schema.table(id(&schema, "log")).unwrap()), vec![2]);
}

#[test]
fn standalone_table_without_key_uses_surrogate() {
    let schema = SchemaBuilder::new("s")
        .table("t")
        .column("a", "INT", true)
        .build()
        .unwrap();
    let hkeys = hkeys(&schema, "t");

    assert_eq!(
        shape(&schema, &hkeys[&id(&schema, "t")]),
        vec![seg("t", &["t.__row_id"])]
    );
}

#[test]
fn materialize_pulls_ancestor_values_from_parent() {
    let schema = non_cascading();
    let hkeys = hkeys(&schema, "customer");
    let orders = &hkeys[&id(&schema, "orders")];
    let item = &hkeys[&id(&schema, "item")];

    // orders row: (oid, cid, ox)
    let orders_key = orders.materialize(&[20, 7, 0], None).unwrap();
    assert_eq!(
        orders_key,
        vec![
            HKeyValue::Ordinal(Ordinal(1)),
            HKeyValue::Column(7),
            HKeyValue::Ordinal(Ordinal(2)),
            HKeyValue::Column(20),
        ]
    );

    // item row: (iid, oid, ix)
    let item_key = item.materialize(&[300, 20, 0], Some(&orders_key)).unwrap();
    assert_eq!(
        item_key,
        vec![
            HKeyValue::Ordinal(Ordinal(1)),
            HKeyValue::Column(7),
            HKeyValue::Ordinal(Ordinal(2)),
            HKeyValue::Column(20),
            HKeyValue::Ordinal(Ordinal(3)),
            HKeyValue::Column(300),
        ]
    );
}

#[test]
fn materialize_without_parent_fails_for_inherited_position() {
    let schema = non_cascading();
    let hkeys = hkeys(&schema, "customer");
    let item = &hkeys[&id(&schema, "item")];

    let err = item.materialize(&[300, 20, 0], None).unwrap_err();
    assert_eq!(err, ResolveError::ParentValueMissing { position: 1 });
}

#[test]
fn materialize_rejects_short_row() {
    let schema = non_cascading();
    let hkeys = hkeys(&schema, "customer");
    let customer = &hkeys[&id(&schema, "customer")];

    let err = customer.materialize::<i64>(&[], None).unwrap_err();
    assert_eq!(err, ResolveError::RowFieldMissing { position: 0 });
}
