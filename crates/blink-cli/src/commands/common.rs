use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use blink_core::models::{board_entries, DisplayValue};
use blink_core::{
    Asset, BlinkService, Board, LibSqlRecordStore, MediaItem, RecordId, SyncSettings,
};
use serde::Serialize;

use crate::error::CliError;

pub type Service = BlinkService<LibSqlRecordStore>;

#[derive(Debug, Serialize)]
pub struct BoardListItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AssetListItem {
    pub file_name: String,
    pub content_type: String,
    pub content_hash: String,
    pub size_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct MediaListItem {
    pub id: String,
    pub board: String,
    pub kinds: Vec<String>,
    pub texts: Vec<String>,
    pub links: Vec<String>,
    pub images: Vec<AssetListItem>,
    pub files: Vec<AssetListItem>,
}

pub async fn open_service(db_path: &Path) -> Result<Service, CliError> {
    let settings = SyncSettings::from_env()?;
    let records = LibSqlRecordStore::open(db_path).await?;
    Ok(BlinkService::new(records, settings))
}

/// Find a board by full id or unique id prefix.
pub async fn resolve_board(query: &str, service: &Service) -> Result<Board, CliError> {
    let query = normalize_identifier(query)?;
    let boards = service.boards().list().await?;

    if let Some(board) = boards.iter().find(|board| board.id.to_string() == query) {
        return Ok(board.clone());
    }

    let matching = boards
        .iter()
        .filter(|board| board.id.to_string().starts_with(&query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::BoardNotFound(query)),
        [board] => Ok((*board).clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|board| short_id(board.id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn parse_record_id(query: &str) -> Result<RecordId, CliError> {
    let query = normalize_identifier(query)?;
    query.parse().map_err(|_| CliError::InvalidId(query))
}

pub async fn resolve_media(query: &str, service: &Service) -> Result<MediaItem, CliError> {
    let id = parse_record_id(query)?;
    service
        .media()
        .fetch_item(id)
        .await?
        .ok_or_else(|| CliError::MediaNotFound(id.to_string()))
}

pub fn short_id(id: RecordId) -> String {
    id.to_string().chars().take(13).collect()
}

pub fn format_board_lines(boards: &[Board]) -> Vec<String> {
    boards
        .iter()
        .map(|board| format!("{}  {}", board.id, board.name))
        .collect()
}

pub fn board_to_list_item(board: &Board) -> BoardListItem {
    BoardListItem {
        id: board.id.to_string(),
        name: board.name.clone(),
    }
}

/// One line per stored value, images first and links last.
pub fn format_media_lines(items: &[MediaItem]) -> Vec<String> {
    board_entries(items)
        .iter()
        .map(|entry| {
            let value = match &entry.value {
                DisplayValue::Text(text) => text_preview(text, 60),
                DisplayValue::Link(link) => link.clone(),
                DisplayValue::Image(asset) | DisplayValue::File(asset) => describe_asset(asset),
            };
            format!("{}  {:<5}  {value}", entry.record_id, entry.kind().as_str())
        })
        .collect()
}

pub fn media_to_list_item(item: &MediaItem) -> MediaListItem {
    MediaListItem {
        id: item.id.to_string(),
        board: item.board.to_string(),
        kinds: item.kinds().iter().map(ToString::to_string).collect(),
        texts: item.text_values.clone(),
        links: item.link_values.clone(),
        images: item.image_assets.iter().map(asset_to_list_item).collect(),
        files: item.file_assets.iter().map(asset_to_list_item).collect(),
    }
}

fn asset_to_list_item(asset: &Asset) -> AssetListItem {
    AssetListItem {
        file_name: asset.file_name.clone(),
        content_type: asset.content_type.clone(),
        content_hash: asset.content_hash.clone(),
        size_bytes: asset.size_bytes(),
    }
}

fn describe_asset(asset: &Asset) -> String {
    format!(
        "{} ({}, {} bytes)",
        asset.file_name,
        asset.content_type,
        asset.size_bytes()
    )
}

pub fn text_preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn resolve_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_content(&text_parts.join(" ")) {
        return Ok(text);
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(text);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyId)
    } else {
        Ok(trimmed.to_ascii_lowercase())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("BLINK_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blink")
        .join("blink.db")
}
