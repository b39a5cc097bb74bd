use crate::{
    association::{AssociationKey, RowKey, shape::RowColumns},
    document::Document,
    value::Value,
};

static NULL: Value = Value::Null;

/// Resolve the value of one row-key column.
///
/// Two sources, checked in order:
/// 1. the association key's own columns
/// 2. the row's stored data
///
/// Association columns may be omitted from row storage entirely; a column
/// found in neither source resolves to null.
pub(super) fn resolve_column_value<'a>(
    key: &'a AssociationKey,
    column: &str,
    row_data: &'a Document,
) -> &'a Value {
    if let Some(value) = key.column_value(column) {
        return value;
    }

    row_data.get(column).unwrap_or(&NULL)
}

/// Rebuild the row key of one stored row.
pub(super) fn reconstruct_row_key(key: &AssociationKey, columns: &RowColumns<'_>) -> RowKey {
    let mut names = Vec::with_capacity(columns.names.len());
    let mut values = Vec::with_capacity(columns.names.len());

    for &column in &columns.names {
        names.push(column.to_string());
        values.push(resolve_column_value(key, column, columns.data).clone());
    }

    RowKey::from_parts(key.table().to_string(), names, values)
}
