//! Record store abstraction.
//!
//! Boards and media live as typed records in a record-oriented database.
//! [`RecordStore`] is the seam between the synchronization layer and a
//! concrete backend: [`MemoryRecordStore`] for in-process use and tests,
//! or [`crate::db::LibSqlRecordStore`] for durable storage.

mod asset;
mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub use asset::{content_hash, Asset};
pub use memory::MemoryRecordStore;

/// A unique identifier for a record, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new unique record ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    String(String),
    StringList(Vec<String>),
    AssetList(Vec<Asset>),
    Reference(RecordId),
}

/// Field name to value map for one record.
pub type Fields = BTreeMap<String, FieldValue>;

/// A record as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Store-assigned identifier
    pub id: RecordId,
    /// Record type name (e.g. `Board`)
    pub record_type: String,
    /// Typed fields
    pub fields: Fields,
    /// Advances on every successful save; saves are conditional on it
    pub change_tag: u64,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last save timestamp (Unix ms)
    pub updated_at: i64,
}

impl Record {
    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Get a string field.
    pub fn string(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Get a string-list field; absent or differently typed fields read as empty.
    pub fn strings(&self, field: &str) -> &[String] {
        match self.fields.get(field) {
            Some(FieldValue::StringList(values)) => values,
            _ => &[],
        }
    }

    /// Get an asset-list field; absent or differently typed fields read as empty.
    pub fn assets(&self, field: &str) -> &[Asset] {
        match self.fields.get(field) {
            Some(FieldValue::AssetList(assets)) => assets,
            _ => &[],
        }
    }

    /// Get a reference field.
    pub fn reference(&self, field: &str) -> Option<RecordId> {
        match self.fields.get(field) {
            Some(FieldValue::Reference(id)) => Some(*id),
            _ => None,
        }
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }
}

/// Query predicate over records of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Every record of the type.
    All,
    /// The record with this id.
    IdEquals(RecordId),
    /// Records whose reference field points at `id`.
    ReferenceEquals { field: String, id: RecordId },
    /// Records whose string field equals `value`.
    FieldEquals { field: String, value: String },
}

impl Predicate {
    /// Records referencing `id` through `field`.
    pub fn references(field: impl Into<String>, id: RecordId) -> Self {
        Self::ReferenceEquals {
            field: field.into(),
            id,
        }
    }

    /// Evaluate the predicate against a record.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::IdEquals(id) => record.id == *id,
            Self::ReferenceEquals { field, id } => record.reference(field) == Some(*id),
            Self::FieldEquals { field, value } => record.string(field) == Some(value.as_str()),
        }
    }
}

/// Record-oriented database operations (async)
///
/// Query results are returned in the backend's arrival order, which callers
/// must not treat as a stable sort order.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Create a record; the store assigns id, change tag and timestamps.
    async fn create(&self, record_type: &str, fields: Fields) -> Result<Record>;

    /// List records of a type matching the predicate.
    async fn query(&self, record_type: &str, predicate: &Predicate) -> Result<Vec<Record>>;

    /// Fetch a record by id.
    async fn fetch(&self, id: RecordId) -> Result<Option<Record>>;

    /// Save a modified record.
    ///
    /// The write only applies when the stored change tag still equals
    /// `record.change_tag`; otherwise it fails with [`crate::Error::Conflict`].
    /// Returns the record as stored, with its advanced change tag.
    async fn save(&self, record: Record) -> Result<Record>;

    /// Delete a record by id.
    async fn delete(&self, id: RecordId) -> Result<()>;
}
