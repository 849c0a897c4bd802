//! Flattened views of a board's media for presentation.

use crate::records::{Asset, RecordId};

use super::media::{MediaItem, MediaKind};

/// One presentable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    Text(String),
    Link(String),
    Image(Asset),
    File(Asset),
}

/// One value taken out of a media record, tagged with the record it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    /// Record holding the value; deleting the entry deletes this record.
    pub record_id: RecordId,
    pub value: DisplayValue,
}

impl DisplayEntry {
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        match self.value {
            DisplayValue::Text(_) => MediaKind::Text,
            DisplayValue::Link(_) => MediaKind::Link,
            DisplayValue::Image(_) => MediaKind::Image,
            DisplayValue::File(_) => MediaKind::File,
        }
    }
}

/// Flatten items into one entry per stored value, ordered images, texts,
/// files, links. Values of equal kind keep their original order.
pub fn board_entries(items: &[MediaItem]) -> Vec<DisplayEntry> {
    let mut entries = Vec::new();
    for item in items {
        let record_id = item.id;
        entries.extend(item.text_values.iter().map(|text| DisplayEntry {
            record_id,
            value: DisplayValue::Text(text.clone()),
        }));
        entries.extend(item.link_values.iter().map(|link| DisplayEntry {
            record_id,
            value: DisplayValue::Link(link.clone()),
        }));
        entries.extend(item.image_assets.iter().map(|asset| DisplayEntry {
            record_id,
            value: DisplayValue::Image(asset.clone()),
        }));
        entries.extend(item.file_assets.iter().map(|asset| DisplayEntry {
            record_id,
            value: DisplayValue::File(asset.clone()),
        }));
    }

    entries.sort_by_key(|entry| entry.kind().display_rank());
    entries
}

/// Quick-insert values across `items`, in item order: each item's links,
/// then its text snippets.
pub fn snippets(items: &[MediaItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.link_values.iter().chain(&item.text_values).cloned())
        .collect()
}
