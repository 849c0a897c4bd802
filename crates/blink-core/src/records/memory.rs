//! In-process record store.

use tokio::sync::Mutex;

use super::{Fields, Predicate, Record, RecordId, RecordStore};
use crate::error::{Error, Result};
use crate::util::now_millis;

/// Insertion-ordered record store held in memory.
///
/// Besides backing tests and ephemeral sessions, it can simulate an
/// unreachable service ([`Self::set_offline`]) and writers racing on the same
/// record ([`Self::inject_save_conflicts`]).
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Record>,
    offline: bool,
    injected_conflicts: u32,
}

impl MemoryState {
    fn ensure_online(&self, operation: &str) -> Result<()> {
        if self.offline {
            Err(Error::Storage(format!(
                "record store unreachable during {operation}"
            )))
        } else {
            Ok(())
        }
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a storage error (or succeed again).
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Make the next `count` saves lose a race against another writer.
    ///
    /// Each injected conflict advances the stored change tag before rejecting
    /// the save, the same way a concurrent save from another device would.
    pub async fn inject_save_conflicts(&self, count: u32) {
        self.state.lock().await.injected_conflicts = count;
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl RecordStore for MemoryRecordStore {
    async fn create(&self, record_type: &str, fields: Fields) -> Result<Record> {
        let mut state = self.state.lock().await;
        state.ensure_online("create")?;

        let now = now_millis();
        let record = Record {
            id: RecordId::new(),
            record_type: record_type.to_string(),
            fields,
            change_tag: 1,
            created_at: now,
            updated_at: now,
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn query(&self, record_type: &str, predicate: &Predicate) -> Result<Vec<Record>> {
        let state = self.state.lock().await;
        state.ensure_online("query")?;

        Ok(state
            .records
            .iter()
            .filter(|record| record.record_type == record_type && predicate.matches(record))
            .cloned()
            .collect())
    }

    async fn fetch(&self, id: RecordId) -> Result<Option<Record>> {
        let state = self.state.lock().await;
        state.ensure_online("fetch")?;

        Ok(state.position(id).map(|index| state.records[index].clone()))
    }

    async fn save(&self, mut record: Record) -> Result<Record> {
        let mut state = self.state.lock().await;
        state.ensure_online("save")?;

        let index = state
            .position(record.id)
            .ok_or_else(|| Error::NotFound(record.id.to_string()))?;

        if state.injected_conflicts > 0 {
            state.injected_conflicts -= 1;
            let stored = &mut state.records[index];
            stored.change_tag += 1;
            stored.updated_at = now_millis();
            return Err(Error::Conflict(record.id.to_string()));
        }

        let stored = &mut state.records[index];
        if stored.change_tag != record.change_tag {
            return Err(Error::Conflict(record.id.to_string()));
        }

        record.record_type.clone_from(&stored.record_type);
        record.created_at = stored.created_at;
        record.change_tag = stored.change_tag + 1;
        record.updated_at = now_millis();
        *stored = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.ensure_online("delete")?;

        let index = state
            .position(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        state.records.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FieldValue;

    fn named(name: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("BoardName".to_string(), FieldValue::String(name.to_string()));
        fields
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_query_preserves_insertion_order() {
        let store = MemoryRecordStore::new();
        let first = store.create("Board", named("one")).await.unwrap();
        let second = store.create("Board", named("two")).await.unwrap();
        store.create("Multimedia", Fields::new()).await.unwrap();

        let boards = store.query("Board", &Predicate::All).await.unwrap();
        let ids = boards.iter().map(|record| record.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_is_conditional_on_change_tag() {
        let store = MemoryRecordStore::new();
        let created = store.create("Board", named("one")).await.unwrap();

        let mut first_copy = created.clone();
        first_copy.set("BoardName", FieldValue::String("first".into()));
        let saved = store.save(first_copy).await.unwrap();
        assert_eq!(saved.change_tag, created.change_tag + 1);

        let mut stale_copy = created;
        stale_copy.set("BoardName", FieldValue::String("stale".into()));
        let error = store.save(stale_copy).await.unwrap_err();
        assert!(matches!(error, Error::Conflict(_)));

        let stored = store.fetch(saved.id).await.unwrap().unwrap();
        assert_eq!(stored.string("BoardName"), Some("first"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn injected_conflict_advances_stored_tag() {
        let store = MemoryRecordStore::new();
        let created = store.create("Board", named("one")).await.unwrap();
        store.inject_save_conflicts(1).await;

        let error = store.save(created.clone()).await.unwrap_err();
        assert!(matches!(error, Error::Conflict(_)));

        let stored = store.fetch(created.id).await.unwrap().unwrap();
        assert_eq!(stored.change_tag, created.change_tag + 1);
        assert!(store.save(stored).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_store_rejects_operations() {
        let store = MemoryRecordStore::new();
        store.set_offline(true).await;

        let error = store.create("Board", named("one")).await.unwrap_err();
        assert!(matches!(error, Error::Storage(_)));
        assert!(store.is_empty().await);

        store.set_offline(false).await;
        assert!(store.create("Board", named("one")).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_missing_record_is_not_found() {
        let store = MemoryRecordStore::new();
        let error = store.delete(RecordId::new()).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }
}
