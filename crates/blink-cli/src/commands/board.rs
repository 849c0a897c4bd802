use std::path::{Path, PathBuf};

use crate::cli::BoardCommands;
use crate::commands::common::{
    board_to_list_item, format_board_lines, open_service, resolve_board, BoardListItem,
};
use crate::error::CliError;

pub async fn run_board(command: BoardCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        BoardCommands::Create => run_create(db_path).await,
        BoardCommands::List { json } => run_list(json, db_path).await,
        BoardCommands::Rename { id, name } => run_rename(&id, &name, db_path).await,
        BoardCommands::Thumbnail { id, output } => {
            run_thumbnail(&id, output.as_deref(), db_path).await
        }
    }
}

async fn run_create(db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let board = service.boards().create().await?;
    println!("{}", board.id);
    Ok(())
}

async fn run_list(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let boards = service.boards().list().await?;

    if as_json {
        let json_items = boards
            .iter()
            .map(board_to_list_item)
            .collect::<Vec<BoardListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_board_lines(&boards) {
            println!("{line}");
        }
    }

    Ok(())
}

async fn run_rename(id: &str, name_parts: &[String], db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let board = resolve_board(id, &service).await?;
    let renamed = service
        .boards()
        .rename(board.id, &name_parts.join(" "))
        .await?;
    println!("{}  {}", renamed.id, renamed.name);
    Ok(())
}

async fn run_thumbnail(id: &str, output: Option<&Path>, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let board = resolve_board(id, &service).await?;
    let thumbnail = service
        .boards()
        .fetch_thumbnail(board.id)
        .await?
        .ok_or_else(|| CliError::NoThumbnail(board.id.to_string()))?;

    let path = output.map_or_else(
        || PathBuf::from(format!("{}.{}", board.id, thumbnail.format.extension())),
        Path::to_path_buf,
    );
    tokio::fs::write(&path, &thumbnail.bytes).await?;
    println!("{}", path.display());
    Ok(())
}
