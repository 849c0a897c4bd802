//! Board operations against the record store.

use std::sync::Arc;

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::mirror::LocalMirror;
use crate::models::{
    normalize_board_name, Board, BOARD_NAME_FIELD, BOARD_RECORD_TYPE, BOARD_REFERENCE_FIELD,
    IMAGE_FIELD, MEDIA_RECORD_TYPE,
};
use crate::records::{FieldValue, Predicate, RecordId, RecordStore};
use crate::storage::{generate_thumbnail, Thumbnail};

/// Creates, lists and renames boards, mirroring every successful write.
pub struct BoardStore<S> {
    records: Arc<S>,
    mirror: LocalMirror,
    settings: Arc<SyncSettings>,
}

impl<S> Clone for BoardStore<S> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            mirror: self.mirror.clone(),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<S: RecordStore> BoardStore<S> {
    pub const fn new(records: Arc<S>, mirror: LocalMirror, settings: Arc<SyncSettings>) -> Self {
        Self {
            records,
            mirror,
            settings,
        }
    }

    #[must_use]
    pub const fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    /// Create a board with the default name.
    pub async fn create(&self) -> Result<Board> {
        let fields = Board::new_fields(&self.settings.default_board_name)?;
        let record = self
            .records
            .create(BOARD_RECORD_TYPE, fields)
            .await
            .inspect_err(|error| tracing::warn!("Failed to create board: {error}"))?;

        let board = Board::from_record(&record)?;
        self.mirror.insert_board(board.clone()).await;
        tracing::debug!(board = %board.id, "Created board");
        Ok(board)
    }

    /// List every board, adding boards not yet mirrored.
    ///
    /// Boards come back in the record store's arrival order.
    pub async fn list(&self) -> Result<Vec<Board>> {
        let records = self
            .records
            .query(BOARD_RECORD_TYPE, &Predicate::All)
            .await
            .inspect_err(|error| tracing::warn!("Failed to list boards: {error}"))?;

        let boards = records
            .iter()
            .map(Board::from_record)
            .collect::<Result<Vec<_>>>()?;
        for board in &boards {
            self.mirror.insert_board(board.clone()).await;
        }

        tracing::debug!(count = boards.len(), "Listed boards");
        Ok(boards)
    }

    /// Rename a board.
    ///
    /// The write is conditional on the record's change tag. When another
    /// writer saves the board first, the record is refetched and the rename
    /// retried, at most `max_conflict_retries` times.
    pub async fn rename(&self, board: RecordId, new_name: &str) -> Result<Board> {
        let name = normalize_board_name(new_name)?;
        let mut retries = 0;

        loop {
            let mut record = self
                .records
                .query(BOARD_RECORD_TYPE, &Predicate::IdEquals(board))
                .await
                .inspect_err(|error| tracing::warn!(%board, "Failed to fetch board: {error}"))?
                .into_iter()
                .next()
                .ok_or_else(|| Error::NotFound(format!("Board {board}")))?;
            record.set(BOARD_NAME_FIELD, FieldValue::String(name.clone()));

            match self.records.save(record).await {
                Ok(saved) => {
                    let renamed = Board::from_record(&saved)?;
                    self.mirror.rename_board(board, &renamed.name).await;
                    tracing::debug!(%board, retries, "Renamed board");
                    return Ok(renamed);
                }
                Err(Error::Conflict(_)) if retries < self.settings.max_conflict_retries => {
                    retries += 1;
                    tracing::debug!(%board, retries, "Board changed during rename, retrying");
                }
                Err(error) => {
                    tracing::warn!(%board, "Failed to rename board: {error}");
                    return Err(error);
                }
            }
        }
    }

    /// Cover image for a board.
    ///
    /// Generated from the first decodable image among the board's media, in
    /// the record store's arrival order. That order is whatever the backend
    /// returns, so the chosen image is not guaranteed to be the oldest.
    pub async fn fetch_thumbnail(&self, board: RecordId) -> Result<Option<Thumbnail>> {
        let records = self
            .records
            .query(
                MEDIA_RECORD_TYPE,
                &Predicate::references(BOARD_REFERENCE_FIELD, board),
            )
            .await
            .inspect_err(|error| tracing::warn!(%board, "Failed to fetch board media: {error}"))?;

        for record in &records {
            for asset in record.assets(IMAGE_FIELD) {
                match generate_thumbnail(&asset.bytes, self.settings.thumbnail) {
                    Ok(thumbnail) => return Ok(Some(thumbnail)),
                    Err(error) => tracing::debug!(
                        record = %record.id,
                        file_name = %asset.file_name,
                        "Skipping undecodable image: {error}"
                    ),
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{media_fields, MediaKind, DEFAULT_BOARD_NAME};
    use crate::records::{Asset, MemoryRecordStore};
    use crate::storage::solid_png;

    fn board_store() -> (Arc<MemoryRecordStore>, BoardStore<MemoryRecordStore>) {
        let records = Arc::new(MemoryRecordStore::new());
        let store = BoardStore::new(
            Arc::clone(&records),
            LocalMirror::new(),
            Arc::new(SyncSettings::default()),
        );
        (records, store)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_uses_default_name_and_mirrors_board() {
        let (_, store) = board_store();
        let board = store.create().await.unwrap();

        assert_eq!(board.name, DEFAULT_BOARD_NAME);
        assert_eq!(store.mirror().boards().await, vec![board]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn created_board_appears_once_in_list() {
        let (_, store) = board_store();
        let created = store.create().await.unwrap();
        store.create().await.unwrap();

        let listed = store.list().await.unwrap();
        let matches = listed.iter().filter(|board| board.id == created.id).count();
        assert_eq!(matches, 1);

        let mirrored = store.mirror().boards().await;
        assert_eq!(mirrored.len(), 2);
        assert_eq!(mirrored.iter().filter(|board| board.id == created.id).count(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_lists_never_duplicate_mirrored_boards() {
        let (records, store) = board_store();
        for name in ["a", "b", "c"] {
            records
                .create(BOARD_RECORD_TYPE, Board::new_fields(name).unwrap())
                .await
                .unwrap();
        }

        let (first, second) = tokio::join!(store.list(), store.list());
        assert_eq!(first.unwrap().len(), 3);
        assert_eq!(second.unwrap().len(), 3);

        let mirrored = store.mirror().boards().await;
        let unique = mirrored.iter().map(|board| board.id).collect::<HashSet<_>>();
        assert_eq!(mirrored.len(), 3);
        assert_eq!(unique.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rename_updates_store_and_mirror() {
        let (records, store) = board_store();
        let board = store.create().await.unwrap();

        let renamed = store.rename(board.id, "  Recipes ").await.unwrap();
        assert_eq!(renamed.name, "Recipes");

        let stored = records.fetch(board.id).await.unwrap().unwrap();
        assert_eq!(stored.string(BOARD_NAME_FIELD), Some("Recipes"));
        assert_eq!(store.mirror().boards().await[0].name, "Recipes");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rename_retries_after_conflicts() {
        let (records, store) = board_store();
        let board = store.create().await.unwrap();
        records.inject_save_conflicts(2).await;

        let renamed = store.rename(board.id, "Trips").await.unwrap();
        assert_eq!(renamed.name, "Trips");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rename_gives_up_after_max_retries() {
        let (records, store) = board_store();
        let board = store.create().await.unwrap();
        records.inject_save_conflicts(10).await;

        let error = store.rename(board.id, "Trips").await.unwrap_err();
        assert!(matches!(error, Error::Conflict(_)));
        assert_eq!(store.mirror().boards().await[0].name, DEFAULT_BOARD_NAME);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rename_rejects_blank_names_and_unknown_boards() {
        let (_, store) = board_store();
        let board = store.create().await.unwrap();

        assert!(matches!(
            store.rename(board.id, "   ").await.unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            store.rename(RecordId::new(), "Ghost").await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_create_leaves_mirror_untouched() {
        let (records, store) = board_store();
        records.set_offline(true).await;

        let error = store.create().await.unwrap_err();
        assert!(matches!(error, Error::Storage(_)));

        let snapshot = store.mirror().snapshot().await;
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.boards.is_empty());
    }

    /// The thumbnail comes from the first image in arrival order. The memory
    /// store returns insertion order, so the board's second item (its only
    /// image) is the one picked.
    #[tokio::test(flavor = "multi_thread")]
    async fn thumbnail_uses_first_image_in_arrival_order() {
        let (records, store) = board_store();
        let board = store.create().await.unwrap();

        records
            .create(
                MEDIA_RECORD_TYPE,
                media_fields(
                    board.id,
                    MediaKind::Text,
                    FieldValue::StringList(vec!["caption".to_string()]),
                ),
            )
            .await
            .unwrap();
        let cover = Asset::new("cover.png", "image/png", solid_png(40, 20, [200, 10, 10, 255]))
            .unwrap();
        records
            .create(
                MEDIA_RECORD_TYPE,
                media_fields(board.id, MediaKind::Image, FieldValue::AssetList(vec![cover])),
            )
            .await
            .unwrap();

        let thumbnail = store.fetch_thumbnail(board.id).await.unwrap().unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (40, 20));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn thumbnail_skips_undecodable_images() {
        let (records, store) = board_store();
        let board = store.create().await.unwrap();

        let broken = Asset::new("broken.jpg", "image/jpeg", b"not an image".to_vec()).unwrap();
        let valid = Asset::new("ok.png", "image/png", solid_png(8, 8, [0, 0, 0, 255])).unwrap();
        records
            .create(
                MEDIA_RECORD_TYPE,
                media_fields(
                    board.id,
                    MediaKind::Image,
                    FieldValue::AssetList(vec![broken, valid]),
                ),
            )
            .await
            .unwrap();

        let thumbnail = store.fetch_thumbnail(board.id).await.unwrap().unwrap();
        assert_eq!(thumbnail.width, 8);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn thumbnail_is_none_without_images() {
        let (_, store) = board_store();
        let board = store.create().await.unwrap();
        assert_eq!(store.fetch_thumbnail(board.id).await.unwrap(), None);
    }
}
