use super::*;
use crate::{
    association::{AssociationSnapshot, KeyError, ShapeKind, SnapshotError},
    config::{DocumentSchema, DuplicateRowPolicy, SnapshotConfig},
    error::{ErrorClass, ErrorOrigin},
    obs::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink},
};
use std::{cell::RefCell, rc::Rc};

fn snapshot_error(err: &crate::error::InternalError) -> &SnapshotError {
    err.snapshot_detail().expect("error must carry snapshot detail")
}

#[test]
fn referenced_rows_restore_association_columns() {
    let snapshot =
        AssociationSnapshot::from_document(&order_items_referenced(), &two_referenced_rows())
            .unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.shape(), ShapeKind::Referenced);

    let keys = snapshot.row_keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys, vec![order_item_key(1), order_item_key(2)]);
    assert_eq!(keys[0].column_names(), ["order_id", "item_id"]);
    assert_eq!(keys[0].column_values(), [Value::Int(42), Value::Int(1)]);
}

#[test]
fn referenced_key_columns_follow_declared_order() {
    let referenced =
        AssociationKey::referenced("Order_Items", [("order_id", 42)], ["item_id", "order_id"])
            .unwrap();
    let embedded = AssociationKey::embedded(
        "Order_Items",
        [("order_id", 42)],
        ["item_id", "order_id"],
        "items",
    )
    .unwrap();
    let stored = doc(json!({
        "rows": [ { "columns": { "item_id": 1 }, "tuple": { "item_id": 1 } } ]
    }));
    let inline = doc(json!({ "items": [ { "item_id": 1 } ] }));

    let referenced = AssociationSnapshot::from_document(&referenced, &stored).unwrap();
    let embedded = AssociationSnapshot::from_document(&embedded, &inline).unwrap();
    let expected =
        RowKey::from_columns("Order_Items", [("item_id", 1), ("order_id", 42)]).unwrap();

    assert_eq!(referenced.row_key_set(), embedded.row_key_set());
    assert!(referenced.contains_key(&expected));
}

#[test]
fn undeclared_stored_columns_trail_declared_ones() {
    let key = AssociationKey::referenced("Order_Items", [("order_id", 42)], ["item_id", "order_id"])
        .unwrap();
    let owner = doc(json!({
        "rows": [ { "columns": { "variant": "red", "item_id": 1 }, "tuple": {} } ]
    }));

    let snapshot = AssociationSnapshot::from_document(&key, &owner).unwrap();
    let row_key = snapshot.row_keys().next().unwrap();

    assert_eq!(row_key.column_names(), ["item_id", "order_id", "variant"]);
    assert_eq!(
        row_key.column_values(),
        [Value::Int(1), Value::Int(42), Value::Text("red".to_string())]
    );
}

#[test]
fn referenced_association_value_wins_over_stored_column() {
    let owner = doc(json!({
        "rows": [ { "columns": { "item_id": 1, "order_id": 7 }, "tuple": { "qty": 3 } } ]
    }));

    let snapshot = AssociationSnapshot::from_document(&order_items_referenced(), &owner).unwrap();
    let row_key = snapshot.row_keys().next().unwrap();

    assert_eq!(row_key, &order_item_key(1));
    assert_eq!(row_key.column_names(), ["order_id", "item_id"]);
    assert_eq!(row_key.value_of("order_id"), Some(&Value::Int(42)));
}

#[test]
fn referenced_get_unwraps_tuple_payload() {
    let snapshot =
        AssociationSnapshot::from_document(&order_items_referenced(), &two_referenced_rows())
            .unwrap();

    let tuple = snapshot.get(&order_item_key(2)).unwrap();
    assert_eq!(tuple.get("qty"), Some(&Value::Int(5)));
    assert_eq!(tuple.payload().len(), 2);
    assert!(tuple.payload().get("columns").is_none());

    // key column absent from the payload still reads back
    assert_eq!(tuple.get("order_id"), Some(&Value::Int(42)));
    assert_eq!(tuple.columns(), ["order_id", "item_id", "qty"]);
}

#[test]
fn raw_row_record_keeps_envelope() {
    let snapshot =
        AssociationSnapshot::from_document(&order_items_referenced(), &two_referenced_rows())
            .unwrap();

    let raw = snapshot.raw_row_record(&order_item_key(1)).unwrap();
    assert!(raw.contains_field("columns"));
    assert!(raw.contains_field("tuple"));
    assert!(snapshot.raw_row_record(&order_item_key(3)).is_none());
    assert!(!snapshot.contains_key(&order_item_key(3)));
}

#[test]
fn embedded_rows_use_declared_row_key_columns() {
    let owner = doc(json!({
        "_id": 42,
        "items": [
            { "item_id": 1, "qty": 3 },
            { "item_id": 2, "qty": 5 },
            { "item_id": 3, "qty": 1 }
        ]
    }));

    let snapshot = AssociationSnapshot::from_document(&order_items_embedded(), &owner).unwrap();

    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.row_key_set().len(), 3);
    assert!(snapshot.contains_key(&order_item_key(3)));

    let tuple = snapshot.get(&order_item_key(1)).unwrap();
    assert_eq!(tuple.payload(), snapshot.raw_row_record(&order_item_key(1)).unwrap());
    assert_eq!(tuple.get("qty"), Some(&Value::Int(3)));
}

#[test]
fn embedded_path_may_be_nested() {
    let key = AssociationKey::embedded(
        "Person_Address",
        [("person_id", "p1")],
        ["person_id", "street"],
        "associations.addresses",
    )
    .unwrap();
    let owner = doc(json!({
        "_id": "p1",
        "associations": { "addresses": [ { "street": "Main" } ] }
    }));

    let snapshot = AssociationSnapshot::from_document(&key, &owner).unwrap();
    let expected = RowKey::from_columns(
        "Person_Address",
        [("person_id", "p1"), ("street", "Main")],
    )
    .unwrap();

    assert!(snapshot.contains_key(&expected));
}

#[test]
fn empty_embedded_association_is_not_an_error() {
    let owner = doc(json!({ "_id": 42 }));

    let snapshot = AssociationSnapshot::from_document(&order_items_embedded(), &owner).unwrap();

    assert_eq!(snapshot.len(), 0);
    assert!(snapshot.is_empty());
    assert!(snapshot.get(&order_item_key(1)).is_none());
    assert_eq!(snapshot.row_keys().count(), 0);
}

#[test]
fn null_rows_field_is_treated_as_absent() {
    let owner = doc(json!({ "_id": "assoc-42", "rows": null }));

    let snapshot = AssociationSnapshot::from_document(&order_items_referenced(), &owner).unwrap();

    assert!(snapshot.is_empty());
}

#[test]
fn referenced_row_missing_columns_is_malformed() {
    let owner = doc(json!({
        "_id": "assoc-42",
        "rows": [
            { "columns": { "item_id": 1 }, "tuple": { "item_id": 1 } },
            { "tuple": { "item_id": 2 } }
        ]
    }));

    let err = AssociationSnapshot::from_document(&order_items_referenced(), &owner).unwrap_err();

    assert_eq!(err.class, ErrorClass::Corruption);
    assert_eq!(err.origin, ErrorOrigin::Snapshot);
    assert!(matches!(
        snapshot_error(&err),
        SnapshotError::MalformedRowRecord { index: 1, reason } if reason.contains("'columns'")
    ));
}

#[test]
fn referenced_row_missing_tuple_is_malformed() {
    let owner = doc(json!({
        "rows": [ { "columns": { "item_id": 1 } } ]
    }));

    let err = AssociationSnapshot::from_document(&order_items_referenced(), &owner).unwrap_err();

    assert!(matches!(
        snapshot_error(&err),
        SnapshotError::MalformedRowRecord { index: 0, reason } if reason.contains("'tuple'")
    ));
}

#[test]
fn non_document_row_is_malformed() {
    let owner = doc(json!({ "items": [ { "item_id": 1 }, 7 ] }));

    let err = AssociationSnapshot::from_document(&order_items_embedded(), &owner).unwrap_err();

    assert!(matches!(
        snapshot_error(&err),
        SnapshotError::MalformedRowRecord { index: 1, .. }
    ));
}

#[test]
fn rows_field_that_is_not_a_list_is_malformed() {
    let owner = doc(json!({ "rows": { "item_id": 1 } }));

    let err = AssociationSnapshot::from_document(&order_items_referenced(), &owner).unwrap_err();

    assert!(matches!(
        snapshot_error(&err),
        SnapshotError::MalformedAssociation { field, found: "document" } if field == "rows"
    ));
}

#[test]
fn duplicate_row_keys_are_rejected_by_default() {
    let owner = doc(json!({
        "items": [ { "item_id": 1, "qty": 1 }, { "item_id": 1, "qty": 2 } ]
    }));

    let err = AssociationSnapshot::from_document(&order_items_embedded(), &owner).unwrap_err();

    assert_eq!(err.class, ErrorClass::Conflict);
    assert!(matches!(
        snapshot_error(&err),
        SnapshotError::DuplicateRowKey { key } if key == "Order_Items(order_id=42, item_id=1)"
    ));
}

#[test]
fn last_write_wins_keeps_first_position_and_later_row() {
    let owner = doc(json!({
        "items": [
            { "item_id": 1, "qty": 1 },
            { "item_id": 2, "qty": 9 },
            { "item_id": 1, "qty": 2 }
        ]
    }));
    let config = SnapshotConfig::default().with_duplicate_rows(DuplicateRowPolicy::LastWriteWins);

    metrics_reset_all();
    let snapshot = AssociationSnapshot::build(&order_items_embedded(), &owner, &config).unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(
        snapshot.row_keys().cloned().collect::<Vec<_>>(),
        vec![order_item_key(1), order_item_key(2)]
    );
    assert_eq!(
        snapshot.get(&order_item_key(1)).unwrap().get("qty"),
        Some(&Value::Int(2))
    );
    assert_eq!(metrics_report().ops.duplicate_rows_overwritten, 1);
}

#[derive(Default)]
struct EventLog(RefCell<Vec<&'static str>>);

impl MetricsSink for EventLog {
    fn record(&self, event: MetricsEvent<'_>) {
        let label = match event {
            MetricsEvent::SnapshotBuilt { .. } => "built",
            MetricsEvent::SnapshotRejected { .. } => "rejected",
            MetricsEvent::DuplicateRowKey { .. } => "duplicate",
        };
        self.0.borrow_mut().push(label);
    }
}

#[test]
fn duplicate_event_is_only_recorded_on_overwrite() {
    let owner = doc(json!({
        "items": [ { "item_id": 1, "qty": 1 }, { "item_id": 1, "qty": 2 } ]
    }));
    let overwrite = SnapshotConfig::default().with_duplicate_rows(DuplicateRowPolicy::LastWriteWins);

    let rejecting = Rc::new(EventLog::default());
    with_metrics_sink(rejecting.clone(), || {
        AssociationSnapshot::from_document(&order_items_embedded(), &owner).unwrap_err();
    });

    let overwriting = Rc::new(EventLog::default());
    with_metrics_sink(overwriting.clone(), || {
        AssociationSnapshot::build(&order_items_embedded(), &owner, &overwrite).unwrap();
    });

    assert_eq!(*rejecting.0.borrow(), ["rejected"]);
    assert_eq!(*overwriting.0.borrow(), ["duplicate", "built"]);
}

#[test]
fn query_identifier_copies_owner_id() {
    let snapshot =
        AssociationSnapshot::from_document(&order_items_referenced(), &two_referenced_rows())
            .unwrap();

    let query = snapshot.query_identifier().unwrap();

    assert_eq!(query.len(), 1);
    assert_eq!(query.get("_id"), Some(&Value::Text("assoc-42".to_string())));
}

#[test]
fn query_identifier_without_owner_id_is_null() {
    let owner = doc(json!({ "rows": [] }));
    let snapshot = AssociationSnapshot::from_document(&order_items_referenced(), &owner).unwrap();

    let query = snapshot.query_identifier().unwrap();

    assert_eq!(query.get("_id"), Some(&Value::Null));
}

#[test]
fn query_identifier_is_unsupported_for_embedded() {
    let owner = doc(json!({ "_id": 42, "items": [] }));
    let snapshot = AssociationSnapshot::from_document(&order_items_embedded(), &owner).unwrap();

    let err = snapshot.query_identifier().unwrap_err();

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert!(matches!(
        snapshot_error(&err),
        SnapshotError::UnsupportedForEmbedded { table } if table == "Order_Items"
    ));
}

#[test]
fn custom_schema_field_names_are_honored() {
    let config = SnapshotConfig {
        schema: DocumentSchema {
            rows_field: "entries".to_string(),
            columns_field: "key".to_string(),
            tuple_field: "data".to_string(),
            id_field: "id".to_string(),
        },
        duplicate_rows: DuplicateRowPolicy::Reject,
    };
    let owner = doc(json!({
        "id": 9,
        "entries": [ { "key": { "item_id": 4 }, "data": { "qty": 8 } } ]
    }));

    let snapshot = AssociationSnapshot::build(&order_items_referenced(), &owner, &config).unwrap();

    assert_eq!(
        snapshot.get(&order_item_key(4)).unwrap().get("qty"),
        Some(&Value::Int(8))
    );
    assert_eq!(
        snapshot.query_identifier().unwrap().get("id"),
        Some(&Value::Int(9))
    );
}

#[test]
fn invalid_config_is_rejected_before_reading_rows() {
    let config = SnapshotConfig {
        schema: DocumentSchema {
            rows_field: String::new(),
            ..DocumentSchema::default()
        },
        duplicate_rows: DuplicateRowPolicy::Reject,
    };

    let err =
        AssociationSnapshot::build(&order_items_referenced(), &two_referenced_rows(), &config)
            .unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::Config);
}

#[test]
fn missing_row_column_resolves_to_null() {
    let owner = doc(json!({ "items": [ { "qty": 1 } ] }));

    let snapshot = AssociationSnapshot::from_document(&order_items_embedded(), &owner).unwrap();
    let key = snapshot.row_keys().next().unwrap();

    assert_eq!(key.column_values(), [Value::Int(42), Value::Null]);
}

#[test]
fn build_reports_metrics() {
    metrics_reset_all();

    let built =
        AssociationSnapshot::from_document(&order_items_referenced(), &two_referenced_rows());
    let bad = doc(json!({ "rows": [ 1 ] }));
    let rejected = AssociationSnapshot::from_document(&order_items_referenced(), &bad);

    assert!(built.is_ok());
    assert!(rejected.is_err());

    let report = metrics_report();
    assert_eq!(report.ops.snapshots_built, 1);
    assert_eq!(report.ops.referenced_builds, 1);
    assert_eq!(report.ops.rows_loaded, 2);
    assert_eq!(report.tables["Order_Items"].builds_rejected, 1);
}

#[test]
fn display_counts_entries() {
    let snapshot =
        AssociationSnapshot::from_document(&order_items_referenced(), &two_referenced_rows())
            .unwrap();

    assert_eq!(snapshot.to_string(), "AssociationSnapshot(2 RowKey entries)");
}

#[test]
fn row_key_equality_is_order_sensitive() {
    let ab = RowKey::from_columns("T", [("a", 1), ("b", 2)]).unwrap();
    let ba = RowKey::from_columns("T", [("b", 2), ("a", 1)]).unwrap();

    assert_ne!(ab, ba);
    assert_eq!(ab.value_of("b"), ba.value_of("b"));
}

#[test]
fn key_construction_validates_arity_and_columns() {
    let err = RowKey::new("T", vec!["a".to_string()], vec![]).unwrap_err();
    assert!(matches!(err, KeyError::ArityMismatch { names: 1, values: 0 }));

    let err = AssociationKey::referenced("T", [("a", 1), ("a", 2)], ["a"]).unwrap_err();
    assert!(matches!(err, KeyError::DuplicateColumn { column } if column == "a"));

    let err = AssociationKey::embedded("T", [("a", 1)], ["a"], "").unwrap_err();
    assert!(matches!(err, KeyError::EmptyEmbeddedPath));

    let err = AssociationKey::referenced("", [("a", 1)], ["a"]).unwrap_err();
    assert!(matches!(err, KeyError::EmptyTable));
}

#[test]
fn association_key_deserialize_revalidates() {
    let encoded = json!({
        "table": "T",
        "column_names": ["a"],
        "column_values": [],
        "row_key_column_names": ["a"],
        "storage": "Referenced"
    });

    assert!(serde_json::from_value::<AssociationKey>(encoded).is_err());
}

#[test]
fn snapshot_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<AssociationSnapshot>();
}
