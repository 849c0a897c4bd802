//! Media item model

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::{Asset, FieldValue, Fields, Record, RecordId};

/// Record type holding media items.
pub const MEDIA_RECORD_TYPE: &str = "Multimedia";
/// Reference field pointing at the owning board.
pub const BOARD_REFERENCE_FIELD: &str = "boardReference";
/// String-list field holding text snippets.
pub const TEXT_FIELD: &str = "TextInsert";
/// String-list field holding links.
pub const LINK_FIELD: &str = "LinkInsert";
/// Asset-list field holding images.
pub const IMAGE_FIELD: &str = "AssetInsert";
/// Asset-list field holding documents.
pub const FILE_FIELD: &str = "fileInsert";

/// Kind of content a media payload field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Text,
    Link,
    Image,
    File,
}

impl MediaKind {
    /// Every kind, in field order.
    pub const ALL: [Self; 4] = [Self::Text, Self::Link, Self::Image, Self::File];

    /// Record field carrying this kind.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Text => TEXT_FIELD,
            Self::Link => LINK_FIELD,
            Self::Image => IMAGE_FIELD,
            Self::File => FILE_FIELD,
        }
    }

    /// Position when a board's content is laid out: images first, links last.
    #[must_use]
    pub const fn display_rank(self) -> u8 {
        match self {
            Self::Image => 1,
            Self::Text => 2,
            Self::File => 3,
            Self::Link => 4,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Link => "link",
            Self::Image => "image",
            Self::File => "file",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "link" => Ok(Self::Link),
            "image" => Ok(Self::Image),
            "file" => Ok(Self::File),
            other => Err(Error::InvalidInput(format!("Unknown media kind: {other}"))),
        }
    }
}

/// A saved media record.
///
/// Stored records carry four independent payload fields. Items written
/// through [`crate::services::MediaStore`] populate exactly one, but records
/// written by other clients may populate several, so all four are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Store-assigned identifier
    pub id: RecordId,
    /// Owning board
    pub board: RecordId,
    /// Text snippets
    pub text_values: Vec<String>,
    /// Links
    pub link_values: Vec<String>,
    /// Images
    pub image_assets: Vec<Asset>,
    /// Documents
    pub file_assets: Vec<Asset>,
}

impl MediaItem {
    /// Decode a media item from its record.
    pub fn from_record(record: &Record) -> Result<Self> {
        if record.record_type != MEDIA_RECORD_TYPE {
            return Err(Error::InvalidInput(format!(
                "Expected a {MEDIA_RECORD_TYPE} record, got {}",
                record.record_type
            )));
        }

        let board = record.reference(BOARD_REFERENCE_FIELD).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Media record {} has no {BOARD_REFERENCE_FIELD}",
                record.id
            ))
        })?;

        Ok(Self {
            id: record.id,
            board,
            text_values: record.strings(TEXT_FIELD).to_vec(),
            link_values: record.strings(LINK_FIELD).to_vec(),
            image_assets: record.assets(IMAGE_FIELD).to_vec(),
            file_assets: record.assets(FILE_FIELD).to_vec(),
        })
    }

    /// Whether the field for `kind` holds at least one value.
    #[must_use]
    pub fn has(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Text => !self.text_values.is_empty(),
            MediaKind::Link => !self.link_values.is_empty(),
            MediaKind::Image => !self.image_assets.is_empty(),
            MediaKind::File => !self.file_assets.is_empty(),
        }
    }

    /// Kinds whose fields are populated.
    #[must_use]
    pub fn kinds(&self) -> Vec<MediaKind> {
        MediaKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }

    /// The item's kind when exactly one payload field is populated.
    #[must_use]
    pub fn kind(&self) -> Option<MediaKind> {
        match self.kinds().as_slice() {
            [kind] => Some(*kind),
            _ => None,
        }
    }

    /// Whether no payload field is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

/// Content to save as a new media item.
///
/// One draft becomes one record with exactly one payload field set.
#[derive(Debug, Clone)]
pub enum MediaDraft {
    /// A text snippet
    Text(String),
    /// An `http(s)` link
    Link(String),
    /// An image, stored JPEG-encoded
    Image(DynamicImage),
    /// A document copied from disk
    File(PathBuf),
}

impl MediaDraft {
    /// Kind of the payload this draft produces.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        match self {
            Self::Text(_) => MediaKind::Text,
            Self::Link(_) => MediaKind::Link,
            Self::Image(_) => MediaKind::Image,
            Self::File(_) => MediaKind::File,
        }
    }
}

/// Fields for a new media record with a single populated payload field.
pub fn media_fields(board: RecordId, kind: MediaKind, payload: FieldValue) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        BOARD_REFERENCE_FIELD.to_string(),
        FieldValue::Reference(board),
    );
    fields.insert(kind.field().to_string(), payload);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn media_record(fields: Fields) -> Record {
        Record {
            id: RecordId::new(),
            record_type: MEDIA_RECORD_TYPE.to_string(),
            fields,
            change_tag: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_single_field_item_has_kind() {
        let board = RecordId::new();
        let record = media_record(media_fields(
            board,
            MediaKind::Text,
            FieldValue::StringList(vec!["hello".to_string()]),
        ));

        let item = MediaItem::from_record(&record).unwrap();
        assert_eq!(item.board, board);
        assert_eq!(item.text_values, vec!["hello".to_string()]);
        assert_eq!(item.kind(), Some(MediaKind::Text));
        assert!(item.link_values.is_empty());
        assert!(item.image_assets.is_empty());
        assert!(item.file_assets.is_empty());
    }

    #[test]
    fn test_multi_field_record_keeps_every_payload() {
        let board = RecordId::new();
        let mut fields = media_fields(
            board,
            MediaKind::Text,
            FieldValue::StringList(vec!["note".to_string()]),
        );
        fields.insert(
            LINK_FIELD.to_string(),
            FieldValue::StringList(vec!["https://example.com".to_string()]),
        );

        let item = MediaItem::from_record(&media_record(fields)).unwrap();
        assert_eq!(item.kinds(), vec![MediaKind::Text, MediaKind::Link]);
        assert_eq!(item.kind(), None);
    }

    #[test]
    fn test_item_without_payload_is_empty() {
        let record = media_record(media_fields(
            RecordId::new(),
            MediaKind::Text,
            FieldValue::StringList(Vec::new()),
        ));
        let item = MediaItem::from_record(&record).unwrap();
        assert!(item.is_empty());
        assert_eq!(item.kind(), None);
    }

    #[test]
    fn test_item_requires_board_reference() {
        let mut fields = Fields::new();
        fields.insert(
            TEXT_FIELD.to_string(),
            FieldValue::StringList(vec!["orphan".to_string()]),
        );
        assert!(MediaItem::from_record(&media_record(fields)).is_err());
    }

    #[test]
    fn test_media_kind_parse_and_rank() {
        assert_eq!("Image".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert!("video".parse::<MediaKind>().is_err());
        assert!(MediaKind::Image.display_rank() < MediaKind::Text.display_rank());
        assert!(MediaKind::File.display_rank() < MediaKind::Link.display_rank());
    }
}
