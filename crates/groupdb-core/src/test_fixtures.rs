//! Shared schemas for unit tests: the customer / orders / item group in its
//! non-cascading and cascading shapes, plus group index variants.

use crate::{
    compile::{CompiledGroup, Compiler},
    ordinal::GroupOrdinals,
};
use groupdb_config::CompilerConfig;
use groupdb_schema::{
    build::SchemaBuilder,
    node::{ColumnRef, JoinType, Schema, TableId, TableName},
};

pub(crate) const SCHEMA: &str = "s";

pub(crate) fn name(table: &str) -> TableName {
    TableName::new(SCHEMA, table)
}

pub(crate) fn id(schema: &Schema, table: &str) -> TableId {
    schema.table_by_name(&name(table)).unwrap().id
}

pub(crate) fn col(schema: &Schema, table: &str, column: &str) -> ColumnRef {
    let t = schema.table_by_name(&name(table)).unwrap();
    t.column_ref(t.column(column).unwrap().position)
}

/// Item and orders keys are independent of their parents' keys.
pub(crate) fn non_cascading() -> Schema {
    SchemaBuilder::new(SCHEMA)
        .table("customer")
        .column("cid", "INT", false)
        .column("cx", "INT", false)
        .primary_key(&["cid"])
        .unique("cid_cx", &["cid", "cx"])
        .table("orders")
        .column("oid", "INT", false)
        .column("cid", "INT", false)
        .column("ox", "INT", false)
        .primary_key(&["oid"])
        .join("customer", &[("cid", "cid")])
        .unique("cid_oid", &["cid", "oid"])
        .unique("oid_cid", &["oid", "cid"])
        .unique("cid_oid_ox", &["cid", "oid", "ox"])
        .index("oc", &["cid"])
        .table("item")
        .column("iid", "INT", false)
        .column("oid", "INT", false)
        .column("ix", "INT", false)
        .primary_key(&["iid"])
        .join("orders", &[("oid", "oid")])
        .index("io", &["oid"])
        .index("oid_iid", &["oid", "iid"])
        .index("iid_oid", &["iid", "oid"])
        .index("oid_iid_ix", &["oid", "iid", "ix"])
        .build()
        .unwrap()
}

/// Every child key begins with its parent's key.
pub(crate) fn cascading() -> Schema {
    SchemaBuilder::new(SCHEMA)
        .table("customer")
        .column("cid", "INT", false)
        .column("cx", "INT", false)
        .primary_key(&["cid"])
        .index("cx", &["cx"])
        .table("orders")
        .column("cid", "INT", false)
        .column("oid", "INT", false)
        .column("ox", "INT", false)
        .primary_key(&["cid", "oid"])
        .join("customer", &[("cid", "cid")])
        .index("oc", &["cid"])
        .index("ox_cid", &["ox", "cid"])
        .table("item")
        .column("cid", "INT", false)
        .column("oid", "INT", false)
        .column("iid", "INT", false)
        .column("ix", "INT", false)
        .primary_key(&["cid", "oid", "iid"])
        .join("orders", &[("cid", "cid"), ("oid", "oid")])
        .index("io", &["cid", "oid"])
        .index("ix_iid_oid_cid", &["ix", "iid", "oid", "cid"])
        .build()
        .unwrap()
}

/// customer / orders / items with the given group indexes declared on customer.
pub(crate) fn coi_with(group_indexes: &[(&str, JoinType, &[(&str, &str)])]) -> Schema {
    let builder = SchemaBuilder::new(SCHEMA)
        .table("customer")
        .column("cid", "INT", false)
        .column("name", "VARCHAR(32)", true)
        .primary_key(&["cid"])
        .table("orders")
        .column("oid", "INT", false)
        .column("cid", "INT", true)
        .column("date", "DATE", true)
        .primary_key(&["oid"])
        .join("customer", &[("cid", "cid")])
        .table("items")
        .column("iid", "INT", false)
        .column("oid", "INT", true)
        .column("sku", "INT", true)
        .primary_key(&["iid"])
        .join("orders", &[("oid", "oid")]);

    group_indexes
        .iter()
        .fold(builder, |b, (index, join_type, columns)| {
            b.group_index("customer", index, false, *join_type, columns)
        })
        .build()
        .unwrap()
}

pub(crate) fn compiler() -> Compiler {
    Compiler::new(&CompilerConfig::default())
}

/// Compile the group rooted at `root` from a fresh ordinal state.
pub(crate) fn compile(schema: &Schema, root: &str) -> CompiledGroup {
    compiler()
        .compile_group(schema, id(schema, root), &GroupOrdinals::default())
        .unwrap()
}
