//! Media operations against the record store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use image::DynamicImage;

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::mirror::LocalMirror;
use crate::models::{
    media_fields, MediaDraft, MediaItem, MediaKind, BOARD_REFERENCE_FIELD, IMAGE_FIELD,
    MEDIA_RECORD_TYPE, TEXT_FIELD,
};
use crate::records::{content_hash, Asset, FieldValue, Predicate, Record, RecordId, RecordStore};
use crate::storage::{decode_image, encode_jpeg, pixels_match, ScratchFile};
use crate::util::is_http_url;

/// Saves, lists and deletes media items, mirroring every successful write.
pub struct MediaStore<S> {
    records: Arc<S>,
    mirror: LocalMirror,
    settings: Arc<SyncSettings>,
}

impl<S> Clone for MediaStore<S> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            mirror: self.mirror.clone(),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<S: RecordStore> MediaStore<S> {
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

    /// Load a board's media into the mirror, replacing what it held.
    ///
    /// With a `filter`, only items whose field for that kind is non-empty are
    /// kept. Items come back in arrival order, each id at most once.
    pub async fn fetch_all(
        &self,
        board: RecordId,
        filter: Option<MediaKind>,
    ) -> Result<Vec<MediaItem>> {
        let records = self
            .records
            .query(
                MEDIA_RECORD_TYPE,
                &Predicate::references(BOARD_REFERENCE_FIELD, board),
            )
            .await
            .inspect_err(|error| tracing::warn!(%board, "Failed to fetch media: {error}"))?;

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(records.len());
        for record in &records {
            let item = MediaItem::from_record(record)?;
            if filter.is_some_and(|kind| !item.has(kind)) || !seen.insert(item.id) {
                continue;
            }
            items.push(item);
        }

        self.mirror.replace_all_media(items.clone()).await;

        tracing::debug!(%board, count = items.len(), ?filter, "Fetched media");
        Ok(items)
    }

    /// Fetch one media item by id. The mirror is left as is.
    pub async fn fetch_item(&self, id: RecordId) -> Result<Option<MediaItem>> {
        self.records
            .fetch(id)
            .await
            .inspect_err(|error| tracing::warn!(%id, "Failed to fetch media: {error}"))?
            .map(|record| MediaItem::from_record(&record))
            .transpose()
    }

    pub async fn fetch_texts(&self, board: RecordId) -> Result<Vec<MediaItem>> {
        self.fetch_all(board, Some(MediaKind::Text)).await
    }

    pub async fn fetch_links(&self, board: RecordId) -> Result<Vec<MediaItem>> {
        self.fetch_all(board, Some(MediaKind::Link)).await
    }

    pub async fn fetch_images(&self, board: RecordId) -> Result<Vec<MediaItem>> {
        self.fetch_all(board, Some(MediaKind::Image)).await
    }

    pub async fn fetch_files(&self, board: RecordId) -> Result<Vec<MediaItem>> {
        self.fetch_all(board, Some(MediaKind::File)).await
    }

    /// Save a draft as a new media item on `board`.
    pub async fn save(&self, board: RecordId, draft: MediaDraft) -> Result<MediaItem> {
        match draft {
            MediaDraft::Text(text) => self.save_text(board, &text).await,
            MediaDraft::Link(link) => self.save_link(board, &link).await,
            MediaDraft::Image(image) => self.save_image(board, &image).await,
            MediaDraft::File(path) => self.save_file(board, &path).await,
        }
    }

    pub async fn save_text(&self, board: RecordId, text: &str) -> Result<MediaItem> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Text cannot be empty".to_string()));
        }
        self.create_item(
            board,
            MediaKind::Text,
            FieldValue::StringList(vec![text.to_string()]),
        )
        .await
    }

    pub async fn save_link(&self, board: RecordId, link: &str) -> Result<MediaItem> {
        let link = link.trim();
        if link.is_empty() {
            return Err(Error::InvalidInput("Link cannot be empty".to_string()));
        }
        if !is_http_url(link) {
            return Err(Error::InvalidInput(format!(
                "Link must start with http:// or https://: {link}"
            )));
        }
        self.create_item(
            board,
            MediaKind::Link,
            FieldValue::StringList(vec![link.to_string()]),
        )
        .await
    }

    /// Save an image as JPEG.
    ///
    /// The encoded bytes are staged in a scratch file that is removed once
    /// the record store call returns, whatever its outcome.
    pub async fn save_image(&self, board: RecordId, image: &DynamicImage) -> Result<MediaItem> {
        let bytes = encode_jpeg(image, self.settings.jpeg_quality)?;
        let scratch = ScratchFile::write(&self.settings.scratch_dir, "jpg", &bytes).await?;
        let asset = Asset::from_path(scratch.path()).await?;

        let result = self
            .create_item(board, MediaKind::Image, FieldValue::AssetList(vec![asset]))
            .await;
        drop(scratch);
        result
    }

    /// Save several images, one record each, concurrently.
    ///
    /// Returns one result per image, in input order.
    pub async fn save_images(
        &self,
        board: RecordId,
        images: &[DynamicImage],
    ) -> Vec<Result<MediaItem>> {
        join_all(images.iter().map(|image| self.save_image(board, image))).await
    }

    /// Save a document, keeping its original file name.
    pub async fn save_file(&self, board: RecordId, path: &Path) -> Result<MediaItem> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidInput(format!("File path has no file name: {}", path.display()))
            })?;

        let scratch = ScratchFile::copy_from(&self.settings.scratch_dir, path)
            .await
            .inspect_err(|error| {
                tracing::warn!(path = %path.display(), "Failed to stage file: {error}");
            })?;
        let asset = Asset::from_path_named(scratch.path(), file_name).await?;

        let result = self
            .create_item(board, MediaKind::File, FieldValue::AssetList(vec![asset]))
            .await;
        drop(scratch);
        result
    }

    /// Delete a media item. Ids of other record types are rejected as
    /// `NotFound`, so boards cannot be removed through here.
    pub async fn delete_by_id(&self, id: RecordId) -> Result<()> {
        self.fetch_media_record(id).await?;
        self.records
            .delete(id)
            .await
            .inspect_err(|error| tracing::warn!(%id, "Failed to delete media: {error}"))?;
        self.mirror.remove_media(id).await;
        tracing::debug!(%id, "Deleted media");
        Ok(())
    }

    /// Remove every occurrence of `text` from an item's text list.
    ///
    /// The field is dropped once its list is empty. The mirror entry is
    /// replaced with the record as saved.
    pub async fn delete_text_value(&self, item: &MediaItem, text: &str) -> Result<MediaItem> {
        self.edit_item(item.id, |record| {
            let values = record.strings(TEXT_FIELD);
            if !values.iter().any(|value| value == text) {
                return false;
            }
            let remaining = values
                .iter()
                .filter(|value| *value != text)
                .cloned()
                .collect::<Vec<_>>();
            set_or_clear(record, TEXT_FIELD, remaining, FieldValue::StringList);
            true
        })
        .await
    }

    /// Remove every image asset matching `image` from an item.
    ///
    /// Assets match on content hash, or failing that, on decoded dimensions
    /// and pixels.
    pub async fn delete_image_value(&self, item: &MediaItem, image: &[u8]) -> Result<MediaItem> {
        let target_hash = content_hash(image);
        let target = decode_image(image).ok();
        self.edit_item(item.id, |record| {
            let assets = record.assets(IMAGE_FIELD);
            let remaining = assets
                .iter()
                .filter(|asset| {
                    asset.content_hash != target_hash && !same_pixels(&asset.bytes, target.as_ref())
                })
                .cloned()
                .collect::<Vec<_>>();
            if remaining.len() == assets.len() {
                return false;
            }
            set_or_clear(record, IMAGE_FIELD, remaining, FieldValue::AssetList);
            true
        })
        .await
    }

    async fn create_item(
        &self,
        board: RecordId,
        kind: MediaKind,
        payload: FieldValue,
    ) -> Result<MediaItem> {
        let record = self
            .records
            .create(MEDIA_RECORD_TYPE, media_fields(board, kind, payload))
            .await
            .inspect_err(|error| tracing::warn!(%board, %kind, "Failed to save media: {error}"))?;

        let item = MediaItem::from_record(&record)?;
        self.mirror.insert_media(item.clone()).await;
        tracing::debug!(%board, %kind, id = %item.id, "Saved media");
        Ok(item)
    }

    /// Fetch a media record fresh, apply `edit`, and save it when `edit`
    /// reports a change. The mirror is resynced either way.
    async fn edit_item(
        &self,
        id: RecordId,
        edit: impl FnOnce(&mut Record) -> bool,
    ) -> Result<MediaItem> {
        let mut record = self.fetch_media_record(id).await?;

        let record = if edit(&mut record) {
            self.records
                .save(record)
                .await
                .inspect_err(|error| tracing::warn!(%id, "Failed to update media: {error}"))?
        } else {
            tracing::debug!(%id, "No matching value to remove");
            record
        };

        let item = MediaItem::from_record(&record)?;
        self.mirror.replace_media(item.clone()).await;
        Ok(item)
    }

    async fn fetch_media_record(&self, id: RecordId) -> Result<Record> {
        self.records
            .fetch(id)
            .await
            .inspect_err(|error| tracing::warn!(%id, "Failed to fetch media: {error}"))?
            .filter(|record| record.record_type == MEDIA_RECORD_TYPE)
            .ok_or_else(|| Error::NotFound(format!("Media item {id}")))
    }
}

fn same_pixels(stored: &[u8], target: Option<&DynamicImage>) -> bool {
    target.is_some_and(|target| {
        decode_image(stored).is_ok_and(|stored| pixels_match(&stored, target))
    })
}

fn set_or_clear<T>(
    record: &mut Record,
    field: &str,
    values: Vec<T>,
    wrap: impl FnOnce(Vec<T>) -> FieldValue,
) {
    if values.is_empty() {
        record.remove(field);
    } else {
        record.set(field, wrap(values));
    }
}
