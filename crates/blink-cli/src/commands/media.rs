use std::path::{Path, PathBuf};

use blink_core::storage::decode_image;
use blink_core::MediaKind;

use crate::cli::{KindArg, MediaCommands};
use crate::commands::common::{
    format_media_lines, media_to_list_item, normalize_content, open_service, parse_record_id,
    resolve_board, resolve_media, resolve_text, MediaListItem,
};
use crate::error::CliError;

pub async fn run_media(command: MediaCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        MediaCommands::List { board, kind, json } => run_list(&board, kind, json, db_path).await,
        MediaCommands::AddText { board, text } => run_add_text(&board, &text, db_path).await,
        MediaCommands::AddLink { board, url } => run_add_link(&board, &url, db_path).await,
        MediaCommands::AddImage { board, paths } => run_add_images(&board, &paths, db_path).await,
        MediaCommands::AddFile { board, paths } => run_add_files(&board, &paths, db_path).await,
        MediaCommands::Delete { id } => run_delete(&id, db_path).await,
        MediaCommands::DeleteText { id, text } => run_delete_text(&id, &text, db_path).await,
        MediaCommands::DeleteImage { id, path } => run_delete_image(&id, &path, db_path).await,
    }
}

async fn run_list(
    board: &str,
    kind: Option<KindArg>,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let board = resolve_board(board, &service).await?;
    let items = service
        .media()
        .fetch_all(board.id, kind.map(MediaKind::from))
        .await?;

    if as_json {
        let json_items = items
            .iter()
            .map(media_to_list_item)
            .collect::<Vec<MediaListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_media_lines(&items) {
            println!("{line}");
        }
    }

    Ok(())
}

async fn run_add_text(board: &str, text_parts: &[String], db_path: &Path) -> Result<(), CliError> {
    let text = resolve_text(text_parts)?;
    let service = open_service(db_path).await?;
    let board = resolve_board(board, &service).await?;

    let item = service.media().save_text(board.id, &text).await?;
    println!("{}", item.id);
    Ok(())
}

async fn run_add_link(board: &str, url: &str, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let board = resolve_board(board, &service).await?;

    let item = service.media().save_link(board.id, url).await?;
    println!("{}", item.id);
    Ok(())
}

async fn run_add_images(board: &str, paths: &[PathBuf], db_path: &Path) -> Result<(), CliError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await?;
        images.push(decode_image(&bytes)?);
    }

    let service = open_service(db_path).await?;
    let board = resolve_board(board, &service).await?;
    let results = service.media().save_images(board.id, &images).await;

    report_saves(paths, results.into_iter().map(|result| result.map(|item| item.id)))
}

async fn run_add_files(board: &str, paths: &[PathBuf], db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let board = resolve_board(board, &service).await?;

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        results.push(service.media().save_file(board.id, path).await.map(|item| item.id));
    }

    report_saves(paths, results)
}

/// Print the id of each saved item and the error of each failed one.
fn report_saves<I, T, E>(paths: &[PathBuf], results: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = Result<T, E>>,
    T: std::fmt::Display,
    E: std::fmt::Display,
{
    let mut failed = 0;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(id) => println!("{id}"),
            Err(error) => {
                failed += 1;
                eprintln!("{}: {error}", path.display());
            }
        }
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed,
            total: paths.len(),
        })
    }
}

async fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let id = parse_record_id(id)?;
    let service = open_service(db_path).await?;

    service.media().delete_by_id(id).await?;
    println!("{id}");
    Ok(())
}

async fn run_delete_text(id: &str, text_parts: &[String], db_path: &Path) -> Result<(), CliError> {
    let text = normalize_content(&text_parts.join(" ")).ok_or(CliError::EmptyContent)?;
    let service = open_service(db_path).await?;
    let item = resolve_media(id, &service).await?;

    let updated = service.media().delete_text_value(&item, &text).await?;
    if updated.text_values.len() == item.text_values.len() {
        eprintln!("No matching text on {}", item.id);
    }
    println!("{}", updated.id);
    Ok(())
}

async fn run_delete_image(id: &str, path: &Path, db_path: &Path) -> Result<(), CliError> {
    let bytes = tokio::fs::read(path).await?;
    let service = open_service(db_path).await?;
    let item = resolve_media(id, &service).await?;

    let updated = service.media().delete_image_value(&item, &bytes).await?;
    if updated.image_assets.len() == item.image_assets.len() {
        eprintln!("No matching image on {}", item.id);
    }
    println!("{}", updated.id);
    Ok(())
}
