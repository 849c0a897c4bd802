//! Runtime settings for the synchronization layer.
//!
//! Defaults suit interactive use. Each value can be overridden through the
//! environment, which the CLI loads from `.env` when present.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::DEFAULT_BOARD_NAME;
use crate::storage::ThumbnailOptions;
use crate::util::normalize_text_option;

const ENV_SCRATCH_DIR: &str = "BLINK_SCRATCH_DIR";
const ENV_JPEG_QUALITY: &str = "BLINK_JPEG_QUALITY";
const ENV_THUMBNAIL_SIZE: &str = "BLINK_THUMBNAIL_SIZE";
const ENV_MAX_CONFLICT_RETRIES: &str = "BLINK_MAX_CONFLICT_RETRIES";

const DEFAULT_JPEG_QUALITY: u8 = 80;
const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;
const MAX_THUMBNAIL_SIZE: u32 = 4096;

/// Settings shared by the board and media stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Board cover generation.
    pub thumbnail: ThumbnailOptions,
    /// JPEG quality (1-100) for uploaded images.
    pub jpeg_quality: u8,
    /// Directory holding outbound assets while they upload.
    pub scratch_dir: PathBuf,
    /// How many times a rename refetches after losing a write race.
    pub max_conflict_retries: u32,
    /// Name given to newly created boards.
    pub default_board_name: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            thumbnail: ThumbnailOptions::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            scratch_dir: env::temp_dir().join("blink-scratch"),
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            default_board_name: DEFAULT_BOARD_NAME.to_string(),
        }
    }
}

impl SyncSettings {
    /// Load settings from process environment variables.
    ///
    /// Unset variables keep their defaults; malformed values are rejected.
    pub fn from_env() -> Result<Self> {
        parse_settings(|key| env::var(key).ok())
    }
}

fn parse_settings(lookup: impl Fn(&str) -> Option<String>) -> Result<SyncSettings> {
    let mut settings = SyncSettings::default();

    if let Some(dir) = normalize_text_option(lookup(ENV_SCRATCH_DIR)) {
        settings.scratch_dir = PathBuf::from(dir);
    }

    if let Some(raw) = normalize_text_option(lookup(ENV_JPEG_QUALITY)) {
        let quality = parse_number::<u8>(ENV_JPEG_QUALITY, &raw)?;
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidInput(format!(
                "{ENV_JPEG_QUALITY} must be between 1 and 100, got {quality}"
            )));
        }
        settings.jpeg_quality = quality;
        settings.thumbnail.jpeg_quality = quality;
    }

    if let Some(raw) = normalize_text_option(lookup(ENV_THUMBNAIL_SIZE)) {
        let size = parse_number::<u32>(ENV_THUMBNAIL_SIZE, &raw)?;
        if size == 0 || size > MAX_THUMBNAIL_SIZE {
            return Err(Error::InvalidInput(format!(
                "{ENV_THUMBNAIL_SIZE} must be between 1 and {MAX_THUMBNAIL_SIZE}, got {size}"
            )));
        }
        settings.thumbnail.max_width = size;
        settings.thumbnail.max_height = size;
    }

    if let Some(raw) = normalize_text_option(lookup(ENV_MAX_CONFLICT_RETRIES)) {
        settings.max_conflict_retries = parse_number::<u32>(ENV_MAX_CONFLICT_RETRIES, &raw)?;
    }

    Ok(settings)
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| Error::InvalidInput(format!("{key} must be a number, got '{raw}'")))
}
