use crate::{
    association::{
        AssociationKey, RowKey, ShapeKind, SnapshotError, Tuple,
        reconstruct::reconstruct_row_key,
        shape::RowShape,
    },
    config::{DuplicateRowPolicy, SnapshotConfig},
    document::Document,
    error::InternalError,
    obs::sink::{self, MetricsEvent, RejectReason},
    value::Value,
};
use std::{
    collections::{HashMap, HashSet},
    fmt,
};

///
/// AssociationSnapshot
///
/// Frozen view of every row of one association, keyed by reconstructed
/// row key. Rows keep the order they were stored in.
///
/// Built once per association load; the persistence engine discards and
/// rebuilds it after any mutation.
///

#[derive(Clone, Debug)]
pub struct AssociationSnapshot {
    table: String,
    shape: ShapeKind,
    tuple_field: String,
    id_field: String,
    owner_id: Option<Value>,
    entries: Vec<(RowKey, Document)>,
    positions: HashMap<RowKey, usize>,
}

impl AssociationSnapshot {
    /// Build a snapshot from the owning document using the default schema.
    pub fn from_document(key: &AssociationKey, owner: &Document) -> Result<Self, InternalError> {
        Self::build(key, owner, &SnapshotConfig::default())
    }

    /// Build a snapshot of `key`'s rows from the already-fetched owning document.
    ///
    /// For an embedded association `owner` is the owning entity document; for
    /// a referenced one it is the association document itself.
    pub fn build(
        key: &AssociationKey,
        owner: &Document,
        config: &SnapshotConfig,
    ) -> Result<Self, InternalError> {
        config.validate()?;
        let result = Self::try_build(key, owner, config);

        match &result {
            Ok(snapshot) => sink::record(MetricsEvent::SnapshotBuilt {
                table: key.table(),
                shape: snapshot.shape,
                rows: u64::try_from(snapshot.len()).unwrap_or(u64::MAX),
            }),
            Err(err) => {
                if let Some(reason) = reject_reason(err) {
                    sink::record(MetricsEvent::SnapshotRejected {
                        table: key.table(),
                        reason,
                    });
                }
            }
        }

        result.map_err(InternalError::from)
    }

    fn try_build(
        key: &AssociationKey,
        owner: &Document,
        config: &SnapshotConfig,
    ) -> Result<Self, SnapshotError> {
        let schema = &config.schema;
        let shape = RowShape::resolve(key, schema);

        // Phase 1: locate the stored rows.
        let rows = shape.extract_rows(owner)?;

        // Phase 2: rebuild one key per row and index the raw record under it.
        let mut entries: Vec<(RowKey, Document)> = Vec::with_capacity(rows.len());
        let mut positions = HashMap::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let columns = shape.row_columns(index, row)?;
            let row_key = reconstruct_row_key(key, &columns);
            let existing = positions.get(&row_key).copied();

            match existing {
                None => {
                    positions.insert(row_key.clone(), entries.len());
                    entries.push((row_key, columns.record.clone()));
                }
                Some(position) => match config.duplicate_rows {
                    DuplicateRowPolicy::Reject => {
                        return Err(SnapshotError::DuplicateRowKey {
                            key: row_key.to_string(),
                        });
                    }
                    DuplicateRowPolicy::LastWriteWins => {
                        sink::record(MetricsEvent::DuplicateRowKey { table: key.table() });
                        entries[position].1 = columns.record.clone();
                    }
                },
            }
        }

        // Phase 3: freeze.
        let owner_id = match shape.kind() {
            ShapeKind::Embedded => None,
            ShapeKind::Referenced => owner.get(&schema.id_field).cloned(),
        };

        Ok(Self {
            table: key.table().to_string(),
            shape: shape.kind(),
            tuple_field: schema.tuple_field.clone(),
            id_field: schema.id_field.clone(),
            owner_id,
            entries,
            positions,
        })
    }

    /// Tuple view of the row stored under `key`.
    #[must_use]
    pub fn get(&self, key: &RowKey) -> Option<Tuple<'_>> {
        let (row_key, record) = self.entry(key)?;

        Some(Tuple::new(row_key, self.payload_of(record)?))
    }

    #[must_use]
    pub fn contains_key(&self, key: &RowKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of rows in the association.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row keys in stored order.
    pub fn row_keys(&self) -> impl Iterator<Item = &RowKey> {
        self.entries.iter().map(|(row_key, _)| row_key)
    }

    /// Owned copy of all row keys.
    #[must_use]
    pub fn row_key_set(&self) -> HashSet<RowKey> {
        self.positions.keys().cloned().collect()
    }

    /// Every row as a tuple, in stored order.
    pub fn rows(&self) -> impl Iterator<Item = Tuple<'_>> {
        self.entries
            .iter()
            .filter_map(|(row_key, record)| Some(Tuple::new(row_key, self.payload_of(record)?)))
    }

    /// The stored row record as read from the document, before tuple unwrapping.
    #[must_use]
    pub fn raw_row_record(&self, key: &RowKey) -> Option<&Document> {
        self.entry(key).map(|(_, record)| record)
    }

    /// Minimal document that identifies the association document in its
    /// collection (its persisted id field only).
    ///
    /// Embedded associations have no document of their own.
    pub fn query_identifier(&self) -> Result<Document, InternalError> {
        match self.shape {
            ShapeKind::Embedded => Err(SnapshotError::UnsupportedForEmbedded {
                table: self.table.clone(),
            }
            .into()),
            ShapeKind::Referenced => {
                let id = self.owner_id.clone().unwrap_or(Value::Null);

                Ok(Document::new().with(self.id_field.as_str(), id))
            }
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn shape(&self) -> ShapeKind {
        self.shape
    }

    fn entry(&self, key: &RowKey) -> Option<&(RowKey, Document)> {
        let position = *self.positions.get(key)?;

        self.entries.get(position)
    }

    // Referenced rows wrap the tuple payload in an envelope; embedded rows are the payload.
    fn payload_of<'a>(&self, record: &'a Document) -> Option<&'a Document> {
        match self.shape {
            ShapeKind::Embedded => Some(record),
            ShapeKind::Referenced => record.get_document(&self.tuple_field),
        }
    }
}

impl fmt::Display for AssociationSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssociationSnapshot({} RowKey entries)", self.len())
    }
}

// Map a construction failure onto its telemetry reason.
const fn reject_reason(err: &SnapshotError) -> Option<RejectReason> {
    match err {
        SnapshotError::MalformedRowRecord { .. } => Some(RejectReason::MalformedRowRecord),
        SnapshotError::MalformedAssociation { .. } => Some(RejectReason::MalformedAssociation),
        SnapshotError::DuplicateRowKey { .. } => Some(RejectReason::DuplicateRowKey),
        SnapshotError::UnsupportedForEmbedded { .. } => None,
    }
}
