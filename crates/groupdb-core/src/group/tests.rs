use super::*;
use crate::test_fixtures::{coi_with, col, id, non_cascading};
use groupdb_schema::build::SchemaBuilder;

fn two_groups() -> Schema {
    SchemaBuilder::new("s")
        .table("a")
        .column("id", "INT", false)
        .primary_key(&["id"])
        .table("x")
        .column("id", "INT", false)
        .primary_key(&["id"])
        .table("a1")
        .column("id", "INT", false)
        .column("aid", "INT", false)
        .primary_key(&["id"])
        .join("a", &[("aid", "id")])
        .table("x1")
        .column("id", "INT", false)
        .column("xid", "INT", false)
        .primary_key(&["id"])
        .join("x", &[("xid", "id")])
        .table("a2")
        .column("id", "INT", false)
        .column("aid", "INT", false)
        .primary_key(&["id"])
        .join("a", &[("aid", "id")])
        .table("a11")
        .column("id", "INT", false)
        .column("a1id", "INT", false)
        .primary_key(&["id"])
        .join("a1", &[("a1id", "id")])
        .build()
        .unwrap()
}

#[test]
fn membership_is_preorder_with_depths() {
    let schema = two_groups();
    let group = GroupMembership::of_root(&schema, id(&schema, "a")).unwrap();

    let order: Vec<_> = group
        .tables()
        .map(|t| schema.table(t).unwrap().name.name().to_string())
        .collect();
    assert_eq!(order, ["a", "a1", "a11", "a2"]);

    let depths: Vec<_> = group.members().iter().map(|m| m.depth).collect();
    assert_eq!(depths, [0, 1, 2, 1]);
    assert_eq!(group.name(), &TableName::new("s", "a"));
    assert_eq!(group.root(), id(&schema, "a"));
    assert!(!group.contains(id(&schema, "x1")));
}

#[test]
fn path_runs_root_to_table() {
    let schema = two_groups();
    let group = GroupMembership::of_root(&schema, id(&schema, "a")).unwrap();

    assert_eq!(
        group.path(id(&schema, "a11")),
        vec![id(&schema, "a"), id(&schema, "a1"), id(&schema, "a11")]
    );
    assert!(group.is_ancestor_or_self(id(&schema, "a1"), id(&schema, "a11")));
    assert!(!group.is_ancestor_or_self(id(&schema, "a2"), id(&schema, "a11")));
}

#[test]
fn discover_returns_groups_in_root_order() {
    let schema = two_groups();
    let groups = discover(&schema).unwrap();

    let names: Vec<_> = groups.iter().map(|g| g.name().to_string()).collect();
    assert_eq!(names, ["s.a", "s.x"]);
    assert_eq!(groups[0].len() + groups[1].len(), schema.tables().len());
}

#[test]
fn non_root_cannot_root_a_group() {
    let schema = two_groups();
    let err = GroupMembership::of_root(&schema, id(&schema, "a1")).unwrap_err();

    assert_eq!(
        err,
        GroupError::NotARoot {
            table: "s.a1".to_string()
        }
    );
}

#[test]
fn join_cycle_is_disconnected() {
    // Two tables joined to each other: neither reaches a root.
    let json = r#"{
        "tables": [
            {"id": 0, "name": "s.p",
             "columns": [{"name": "id", "position": 0, "ty": "INT", "nullable": false}],
             "primary_key": {"columns": [0]},
             "parent_join": {"name": "s.q/s.p", "parent": 1, "columns": [{"parent": 0, "child": 0}]}},
            {"id": 1, "name": "s.q",
             "columns": [{"name": "id", "position": 0, "ty": "INT", "nullable": false}],
             "primary_key": {"columns": [0]},
             "parent_join": {"name": "s.p/s.q", "parent": 0, "columns": [{"parent": 0, "child": 0}]}}
        ]
    }"#;
    let schema: Schema = serde_json::from_str(json).unwrap();

    assert!(matches!(
        root_of(&schema, TableId(0)),
        Err(GroupError::Disconnected { .. })
    ));
    assert!(matches!(
        discover(&schema),
        Err(GroupError::Disconnected { .. })
    ));
}

#[test]
fn layout_concatenates_members_in_preorder() {
    let schema = coi_with(&[]);
    let group = GroupMembership::of_root(&schema, id(&schema, "customer")).unwrap();
    let layout = GroupRowLayout::assemble(&schema, &group);

    // (c.cid, c.name, o.oid, o.cid, o.date, i.iid, i.oid, i.sku)
    assert_eq!(layout.len(), 8);
    assert_eq!(layout.offset(id(&schema, "orders")), Some(2));
    assert_eq!(layout.offset(id(&schema, "items")), Some(5));
    assert_eq!(layout.field_of(col(&schema, "customer", "name")), Some(1));
    assert_eq!(layout.field_of(col(&schema, "orders", "date")), Some(4));
    assert_eq!(layout.field_of(col(&schema, "items", "sku")), Some(7));
    assert_eq!(layout.column_at(3), Some(col(&schema, "orders", "cid")));
}

#[test]
fn layout_includes_internal_columns() {
    let schema = SchemaBuilder::new("s")
        .table("p")
        .column("id", "INT", false)
        .primary_key(&["id"])
        .table("c")
        .column("pid", "INT", false)
        .join("p", &[("pid", "id")])
        .build()
        .unwrap();
    let group = GroupMembership::of_root(&schema, id(&schema, "p")).unwrap();
    let layout = GroupRowLayout::assemble(&schema, &group);

    assert_eq!(layout.len(), 3);
    assert_eq!(layout.field_of(col(&schema, "c", "__row_id")), Some(2));
}

#[test]
fn flatten_pads_missing_tables() {
    let schema = non_cascading();
    let group = GroupMembership::of_root(&schema, id(&schema, "customer")).unwrap();
    let layout = GroupRowLayout::assemble(&schema, &group);

    let mut rows = std::collections::BTreeMap::new();
    rows.insert(id(&schema, "customer"), vec![Some(1), Some(2)]);
    rows.insert(id(&schema, "item"), vec![Some(9)]);

    let flat = layout.flatten(&rows, &None);
    assert_eq!(
        flat,
        vec![Some(1), Some(2), None, None, None, Some(9), None, None]
    );
}
