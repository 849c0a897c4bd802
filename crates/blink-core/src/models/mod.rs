//! Data models for Blink

mod board;
mod display;
mod media;

pub use board::{
    normalize_board_name, Board, BOARD_NAME_FIELD, BOARD_RECORD_TYPE, DEFAULT_BOARD_NAME,
};
pub use display::{board_entries, snippets, DisplayEntry, DisplayValue};
pub use media::{
    media_fields, MediaDraft, MediaItem, MediaKind, BOARD_REFERENCE_FIELD, FILE_FIELD,
    IMAGE_FIELD, LINK_FIELD, MEDIA_RECORD_TYPE, TEXT_FIELD,
};
