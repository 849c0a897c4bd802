use std::path::Path;

use blink_core::models::snippets;

use crate::commands::common::{open_service, resolve_board};
use crate::error::CliError;

pub async fn run_snippets(board: &str, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path).await?;
    let board = resolve_board(board, &service).await?;
    let items = service.media().fetch_all(board.id, None).await?;

    for snippet in snippets(&items) {
        println!("{snippet}");
    }
    Ok(())
}
