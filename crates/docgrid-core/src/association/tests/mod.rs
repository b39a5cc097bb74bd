mod snapshot;

use crate::{
    association::{AssociationKey, RowKey},
    document::Document,
    value::Value,
};
use serde_json::json;

// Decode a JSON fixture into a document.
fn doc(json: serde_json::Value) -> Document {
    Document::try_from_json(json).expect("fixture must be a JSON object")
}

fn order_items_referenced() -> AssociationKey {
    AssociationKey::referenced("Order_Items", [("order_id", 42)], ["order_id", "item_id"]).unwrap()
}

fn order_items_embedded() -> AssociationKey {
    AssociationKey::embedded(
        "Order_Items",
        [("order_id", 42)],
        ["order_id", "item_id"],
        "items",
    )
    .unwrap()
}

fn order_item_key(item_id: i64) -> RowKey {
    RowKey::from_columns(
        "Order_Items",
        [("order_id", Value::Int(42)), ("item_id", Value::Int(item_id))],
    )
    .unwrap()
}

// Referenced association document with two item rows.
fn two_referenced_rows() -> Document {
    doc(json!({
        "_id": "assoc-42",
        "rows": [
            { "columns": { "item_id": 1 }, "tuple": { "item_id": 1, "qty": 3 } },
            { "columns": { "item_id": 2 }, "tuple": { "item_id": 2, "qty": 5 } }
        ]
    }))
}
