use crate::{
    association::{AssociationKey, AssociationStorage, ShapeKind, SnapshotError},
    config::DocumentSchema,
    document::Document,
    value::Value,
};

///
/// RowShape
///
/// Extraction strategy for one association, resolved once from the key's
/// storage flag. Borrowed from the key and schema for the duration of a build.
///

pub(super) enum RowShape<'k> {
    Embedded {
        path: &'k str,
        row_key_columns: &'k [String],
    },
    Referenced {
        association_columns: &'k [String],
        row_key_columns: &'k [String],
        rows_field: &'k str,
        columns_field: &'k str,
        tuple_field: &'k str,
    },
}

///
/// RowColumns
///
/// Key column names of one row plus the record their non-association values
/// are read from.
///
/// Embedded rows use the declared row-key columns. Referenced rows take:
/// - association columns that are neither declared nor stored, in key order
/// - declared row-key columns that are stored or known to the association,
///   in declared order
/// - stored columns that are not declared, in stored order
///

pub(super) struct RowColumns<'a> {
    pub(super) names: Vec<&'a str>,
    pub(super) data: &'a Document,
    pub(super) record: &'a Document,
}

impl<'k> RowShape<'k> {
    pub(super) fn resolve(key: &'k AssociationKey, schema: &'k DocumentSchema) -> Self {
        match key.storage() {
            AssociationStorage::Embedded { path } => Self::Embedded {
                path,
                row_key_columns: key.row_key_column_names(),
            },
            AssociationStorage::Referenced => Self::Referenced {
                association_columns: key.column_names(),
                row_key_columns: key.row_key_column_names(),
                rows_field: &schema.rows_field,
                columns_field: &schema.columns_field,
                tuple_field: &schema.tuple_field,
            },
        }
    }

    pub(super) const fn kind(&self) -> ShapeKind {
        match self {
            Self::Embedded { .. } => ShapeKind::Embedded,
            Self::Referenced { .. } => ShapeKind::Referenced,
        }
    }

    /// Borrow the stored rows of the association.
    ///
    /// An absent (or null) rows field is an association with zero rows.
    pub(super) fn extract_rows<'d>(
        &self,
        owner: &'d Document,
    ) -> Result<&'d [Value], SnapshotError> {
        let (field, found) = match self {
            Self::Embedded { path, .. } => (*path, owner.get_path(path)),
            Self::Referenced { rows_field, .. } => (*rows_field, owner.get(rows_field)),
        };

        match found {
            None | Some(Value::Null) => Ok(&[][..]),
            Some(Value::List(rows)) => Ok(rows.as_slice()),
            Some(other) => Err(SnapshotError::MalformedAssociation {
                field: field.to_string(),
                found: other.kind_label(),
            }),
        }
    }

    /// Split one stored row into its key column names and value source.
    ///
    /// Referenced rows are checked for both envelope sub-records here, so
    /// later tuple access cannot fail.
    pub(super) fn row_columns<'a>(
        &self,
        index: usize,
        row: &'a Value,
    ) -> Result<RowColumns<'a>, SnapshotError>
    where
        'k: 'a,
    {
        let Some(record) = row.as_document() else {
            return Err(SnapshotError::MalformedRowRecord {
                index,
                reason: format!("row is {}, expected a document", row.kind_label()),
            });
        };

        match self {
            Self::Embedded {
                row_key_columns, ..
            } => Ok(RowColumns {
                names: row_key_columns.iter().map(String::as_str).collect(),
                data: record,
                record,
            }),
            Self::Referenced {
                association_columns,
                row_key_columns,
                columns_field,
                tuple_field,
                ..
            } => {
                let columns = sub_record(index, record, columns_field)?;
                sub_record(index, record, tuple_field)?;

                let leading = association_columns.iter().map(String::as_str).filter(|name| {
                    !lists(row_key_columns, name) && !columns.contains_field(name)
                });
                let declared = row_key_columns.iter().map(String::as_str).filter(|name| {
                    columns.contains_field(name) || lists(association_columns, name)
                });
                let trailing = columns
                    .field_names()
                    .filter(|name| !lists(row_key_columns, name));

                Ok(RowColumns {
                    names: leading.chain(declared).chain(trailing).collect(),
                    data: columns,
                    record,
                })
            }
        }
    }
}

fn lists(names: &[String], name: &str) -> bool {
    names.iter().any(|listed| listed == name)
}

// Borrow a required sub-document of a referenced row envelope.
fn sub_record<'a>(
    index: usize,
    record: &'a Document,
    field: &str,
) -> Result<&'a Document, SnapshotError> {
    match record.get(field) {
        Some(Value::Document(doc)) => Ok(doc),
        Some(other) => Err(SnapshotError::MalformedRowRecord {
            index,
            reason: format!("'{field}' holds {}, expected a document", other.kind_label()),
        }),
        None => Err(SnapshotError::MalformedRowRecord {
            index,
            reason: format!("missing '{field}' sub-record"),
        }),
    }
}
