//! libSQL-backed record store

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use libsql::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::Database;
use crate::error::{Error, Result};
use crate::records::{Asset, FieldValue, Fields, Predicate, Record, RecordId, RecordStore};
use crate::util::now_millis;

const RECORD_COLUMNS: &str = "id, record_type, fields, change_tag, created_at, updated_at";

/// Field as persisted in the `fields` JSON column.
///
/// Asset lists only leave a marker here; their contents live in
/// `record_assets`, one row per asset.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum StoredField {
    String(String),
    StringList(Vec<String>),
    Reference(RecordId),
    AssetList,
}

impl From<&FieldValue> for StoredField {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::String(value) => Self::String(value.clone()),
            FieldValue::StringList(values) => Self::StringList(values.clone()),
            FieldValue::Reference(id) => Self::Reference(*id),
            FieldValue::AssetList(_) => Self::AssetList,
        }
    }
}

impl From<StoredField> for FieldValue {
    fn from(value: StoredField) -> Self {
        match value {
            StoredField::String(value) => Self::String(value),
            StoredField::StringList(values) => Self::StringList(values),
            StoredField::Reference(id) => Self::Reference(id),
            StoredField::AssetList => Self::AssetList(Vec::new()),
        }
    }
}

/// Durable [`RecordStore`] on a libSQL database.
#[derive(Clone)]
pub struct LibSqlRecordStore {
    db: Arc<Mutex<Database>>,
}

impl LibSqlRecordStore {
    /// Open (or create) the record database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_database(Database::open(path).await?))
    }

    /// Open an in-memory record database (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory().await?))
    }

    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

impl RecordStore for LibSqlRecordStore {
    async fn create(&self, record_type: &str, fields: Fields) -> Result<Record> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let now = now_millis();
        let record = Record {
            id: RecordId::new(),
            record_type: record_type.to_string(),
            fields,
            change_tag: 1,
            created_at: now,
            updated_at: now,
        };

        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = insert_record(conn, &record).await;
        finish_transaction(conn, result).await?;
        Ok(record)
    }

    async fn query(&self, record_type: &str, predicate: &Predicate) -> Result<Vec<Record>> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let mut rows = match predicate {
            Predicate::IdEquals(id) => {
                conn.query(
                    &format!(
                        "SELECT {RECORD_COLUMNS} FROM records
                         WHERE record_type = ?1 AND id = ?2 ORDER BY seq"
                    ),
                    params![record_type, id.as_str()],
                )
                .await?
            }
            _ => {
                conn.query(
                    &format!(
                        "SELECT {RECORD_COLUMNS} FROM records WHERE record_type = ?1 ORDER BY seq"
                    ),
                    [record_type],
                )
                .await?
            }
        };

        // Predicates only inspect scalar fields, so assets load after filtering.
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let record = decode_row(&row)?;
            if predicate.matches(&record) {
                records.push(record);
            }
        }
        drop(rows);

        for record in &mut records {
            load_assets(conn, record).await?;
        }
        Ok(records)
    }

    async fn fetch(&self, id: RecordId) -> Result<Option<Record>> {
        let db = self.db.lock().await;
        fetch_record(db.connection(), id).await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let db = self.db.lock().await;
        let conn = db.connection();

        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = update_record(conn, &record).await;
        finish_transaction(conn, result).await
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        let db = self.db.lock().await;
        let deleted = db
            .connection()
            .execute("DELETE FROM records WHERE id = ?1", [id.as_str()])
            .await?;

        if deleted == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}

async fn finish_transaction<T>(conn: &Connection, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            if let Err(e) = conn.execute("COMMIT", ()).await {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
            Ok(value)
        }
        Err(error) => {
            conn.execute("ROLLBACK", ()).await.ok();
            Err(error)
        }
    }
}

async fn insert_record(conn: &Connection, record: &Record) -> Result<()> {
    conn.execute(
        "INSERT INTO records (id, record_type, fields, change_tag, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.as_str(),
            record.record_type.as_str(),
            encode_fields(&record.fields)?,
            tag_to_sql(record.change_tag)?,
            record.created_at,
            record.updated_at,
        ],
    )
    .await?;
    write_assets(conn, record).await
}

async fn update_record(conn: &Connection, record: &Record) -> Result<Record> {
    let id = record.id.as_str();
    let updated = conn
        .execute(
            "UPDATE records SET fields = ?1, change_tag = change_tag + 1, updated_at = ?2
             WHERE id = ?3 AND change_tag = ?4",
            params![
                encode_fields(&record.fields)?,
                now_millis(),
                id.as_str(),
                tag_to_sql(record.change_tag)?,
            ],
        )
        .await?;

    if updated == 0 {
        return Err(if fetch_record(conn, record.id).await?.is_some() {
            Error::Conflict(id)
        } else {
            Error::NotFound(id)
        });
    }

    conn.execute("DELETE FROM record_assets WHERE record_id = ?1", [id.as_str()])
        .await?;
    write_assets(conn, record).await?;

    fetch_record(conn, record.id)
        .await?
        .ok_or_else(|| Error::NotFound(record.id.to_string()))
}

async fn write_assets(conn: &Connection, record: &Record) -> Result<()> {
    for (field, value) in &record.fields {
        let FieldValue::AssetList(assets) = value else {
            continue;
        };
        for (position, asset) in assets.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| Error::Database(format!("Too many assets in {field}")))?;
            conn.execute(
                "INSERT INTO record_assets
                    (record_id, field, position, file_name, content_type, content_hash, bytes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id.as_str(),
                    field.as_str(),
                    position,
                    asset.file_name.as_str(),
                    asset.content_type.as_str(),
                    asset.content_hash.as_str(),
                    asset.bytes.clone(),
                ],
            )
            .await?;
        }
    }
    Ok(())
}

async fn fetch_record(conn: &Connection, id: RecordId) -> Result<Option<Record>> {
    let mut rows = conn
        .query(
            &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
            [id.as_str()],
        )
        .await?;

    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    let mut record = decode_row(&row)?;
    drop(rows);

    load_assets(conn, &mut record).await?;
    Ok(Some(record))
}

async fn load_assets(conn: &Connection, record: &mut Record) -> Result<()> {
    let mut rows = conn
        .query(
            "SELECT field, file_name, content_type, content_hash, bytes
             FROM record_assets WHERE record_id = ?1 ORDER BY field, position",
            [record.id.as_str()],
        )
        .await?;

    while let Some(row) = rows.next().await? {
        let field: String = row.get(0)?;
        let asset = Asset {
            file_name: row.get(1)?,
            content_type: row.get(2)?,
            content_hash: row.get(3)?,
            bytes: row.get(4)?,
        };
        match record.fields.get_mut(&field) {
            Some(FieldValue::AssetList(assets)) => assets.push(asset),
            _ => tracing::warn!(
                record = %record.id,
                field = %field,
                "Ignoring asset stored for a field that is not an asset list"
            ),
        }
    }
    Ok(())
}

fn decode_row(row: &Row) -> Result<Record> {
    let id: String = row.get(0)?;
    let fields: String = row.get(2)?;
    let change_tag: i64 = row.get(3)?;

    let stored: BTreeMap<String, StoredField> = serde_json::from_str(&fields)?;
    Ok(Record {
        id: id
            .parse()
            .map_err(|e| Error::Database(format!("Invalid record id '{id}': {e}")))?,
        record_type: row.get(1)?,
        fields: stored
            .into_iter()
            .map(|(name, value)| (name, FieldValue::from(value)))
            .collect(),
        change_tag: u64::try_from(change_tag)
            .map_err(|_| Error::Database(format!("Invalid change tag {change_tag}")))?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn encode_fields(fields: &Fields) -> Result<String> {
    let stored: BTreeMap<&str, StoredField> = fields
        .iter()
        .map(|(name, value)| (name.as_str(), StoredField::from(value)))
        .collect();
    Ok(serde_json::to_string(&stored)?)
}

fn tag_to_sql(tag: u64) -> Result<i64> {
    i64::try_from(tag).map_err(|_| Error::Database(format!("Change tag {tag} out of range")))
}
