use super::*;
use crate::{
    group::GroupMembership,
    test_fixtures::{id, name, non_cascading},
};
use groupdb_schema::build::SchemaBuilder;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn assign(schema: &Schema, previous: &GroupOrdinals) -> Result<GroupOrdinals, OrdinalError> {
    let membership = GroupMembership::of_root(schema, id(schema, "customer")).unwrap();
    OrdinalAssigner::new(1, 10).assign(schema, &membership, previous)
}

fn customer_orders() -> Schema {
    SchemaBuilder::new("s")
        .table("customer")
        .column("cid", "INT", false)
        .primary_key(&["cid"])
        .table("orders")
        .column("oid", "INT", false)
        .column("cid", "INT", false)
        .primary_key(&["oid"])
        .join("customer", &[("cid", "cid")])
        .build()
        .unwrap()
}

#[test]
fn fresh_group_counts_up_from_base_in_preorder() {
    let schema = non_cascading();
    let ordinals = assign(&schema, &GroupOrdinals::default()).unwrap();

    assert_eq!(ordinals.get(&name("customer")), Some(Ordinal(1)));
    assert_eq!(ordinals.get(&name("orders")), Some(Ordinal(2)));
    assert_eq!(ordinals.get(&name("item")), Some(Ordinal(3)));
    assert_eq!(ordinals.high_water(), 3);
}

#[test]
fn custom_base_is_honoured() {
    let schema = non_cascading();
    let membership = GroupMembership::of_root(&schema, id(&schema, "customer")).unwrap();
    let ordinals = OrdinalAssigner::new(100, 200)
        .assign(&schema, &membership, &GroupOrdinals::default())
        .unwrap();

    assert_eq!(ordinals.get(&name("customer")), Some(Ordinal(100)));
    assert_eq!(ordinals.get(&name("item")), Some(Ordinal(102)));
}

#[test]
fn surviving_tables_keep_ordinals_and_new_ones_extend() {
    let before = assign(&customer_orders(), &GroupOrdinals::default()).unwrap();
    let after = assign(&non_cascading(), &before).unwrap();

    assert_eq!(after.get(&name("customer")), Some(Ordinal(1)));
    assert_eq!(after.get(&name("orders")), Some(Ordinal(2)));
    assert_eq!(after.get(&name("item")), Some(Ordinal(3)));
}

#[test]
fn dropped_table_ordinal_is_never_reissued() {
    let full = assign(&non_cascading(), &GroupOrdinals::default()).unwrap();

    // item dropped
    let shrunk = assign(&customer_orders(), &full).unwrap();
    assert_eq!(shrunk.get(&name("item")), None);
    assert_eq!(shrunk.retired().get(&Ordinal(3)), Some(&name("item")));

    // item recreated: it gets a fresh ordinal
    let regrown = assign(&non_cascading(), &shrunk).unwrap();
    assert_eq!(regrown.get(&name("item")), Some(Ordinal(4)));
    assert_eq!(regrown.high_water(), 4);
}

#[test]
fn reassignment_is_idempotent() {
    let schema = non_cascading();
    let first = assign(&schema, &GroupOrdinals::default()).unwrap();
    let second = assign(&schema, &first).unwrap();

    assert_eq!(first, second);
}

#[test]
fn exhaustion_is_reported() {
    let schema = non_cascading();
    let membership = GroupMembership::of_root(&schema, id(&schema, "customer")).unwrap();
    let err = OrdinalAssigner::new(1, 2)
        .assign(&schema, &membership, &GroupOrdinals::default())
        .unwrap_err();

    assert_eq!(
        err,
        OrdinalError::Exhausted {
            table: "s.item".to_string(),
            max: 2
        }
    );
}

#[test]
fn duplicate_previous_ordinal_is_a_conflict() {
    let json = r#"{"assigned": {"s.customer": 1, "s.orders": 1}}"#;
    let previous: GroupOrdinals = serde_json::from_str(json).unwrap();

    let err = assign(&non_cascading(), &previous).unwrap_err();
    assert!(matches!(err, OrdinalError::Conflict { ordinal: Ordinal(1), .. }));
}

#[test]
fn live_ordinal_also_retired_is_a_conflict() {
    let json = r#"{"assigned": {"s.customer": 1}, "retired": {"1": "s.old"}}"#;
    let previous: GroupOrdinals = serde_json::from_str(json).unwrap();

    assert!(matches!(
        assign(&non_cascading(), &previous),
        Err(OrdinalError::Conflict { .. })
    ));
}

#[test]
fn retire_all_moves_every_ordinal() {
    let mut ordinals = assign(&non_cascading(), &GroupOrdinals::default()).unwrap();
    ordinals.retire_all();

    assert!(ordinals.is_empty());
    assert_eq!(ordinals.retired().len(), 3);

    let again = assign(&non_cascading(), &ordinals).unwrap();
    assert_eq!(again.get(&name("customer")), Some(Ordinal(4)));
}

proptest! {
    // Ordinals stay unique within the group however tables come and go.
    #[test]
    fn ordinals_are_unique_across_generations(keep in proptest::collection::vec(any::<bool>(), 1..6)) {
        let full = non_cascading();
        let mut state = assign(&full, &GroupOrdinals::default()).unwrap();

        for drop_item in keep {
            let schema = if drop_item { customer_orders() } else { full.clone() };
            state = assign(&schema, &state).unwrap();

            let live: BTreeSet<_> = state.assigned().values().copied().collect();
            prop_assert_eq!(live.len(), state.len());
            for ordinal in state.retired().keys() {
                prop_assert!(!live.contains(ordinal));
            }
        }
    }
}
