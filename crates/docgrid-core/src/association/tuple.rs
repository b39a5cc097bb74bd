use crate::{association::RowKey, document::Document, value::Value};

///
/// Tuple
///
/// Column view of one association row, borrowed from its snapshot.
///
/// Key columns are answered from the row key, so association columns that
/// were left out of row storage still read back. All other columns come from
/// the stored payload.
///

#[derive(Clone, Copy, Debug)]
pub struct Tuple<'a> {
    row_key: &'a RowKey,
    payload: &'a Document,
}

impl<'a> Tuple<'a> {
    pub(super) const fn new(row_key: &'a RowKey, payload: &'a Document) -> Self {
        Self { row_key, payload }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.row_key
            .value_of(column)
            .or_else(|| self.payload.get(column))
    }

    /// Key columns in key order, then the remaining payload columns in
    /// stored order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'a str> {
        let key_columns = self.row_key.column_names().iter().map(String::as_str);
        let payload_columns = self
            .payload
            .field_names()
            .filter(|name| self.row_key.value_of(name).is_none());

        key_columns.chain(payload_columns).collect()
    }

    #[must_use]
    pub const fn row_key(&self) -> &'a RowKey {
        self.row_key
    }

    /// The stored payload, without key columns filled in.
    #[must_use]
    pub const fn payload(&self) -> &'a Document {
        self.payload
    }

    /// Materialize every column of the row into an owned document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        self.columns()
            .into_iter()
            .filter_map(|column| Some((column, self.get(column)?.clone())))
            .collect()
    }
}
