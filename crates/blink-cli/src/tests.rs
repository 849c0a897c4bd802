use std::path::PathBuf;

use blink_core::MediaKind;
use clap::Parser;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::cli::{BoardCommands, Cli, Commands, CompletionShell, KindArg, MediaCommands};
use crate::commands::common::{
    format_media_lines, media_to_list_item, normalize_content, normalize_identifier,
    open_service, parse_record_id, resolve_board, resolve_db_path, resolve_media, text_preview,
};
use crate::commands::completions::{render_completions, run_completions};
use crate::error::CliError;

fn test_db() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blink.db");
    (dir, path)
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_content_keeps_multiline_text() {
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn normalize_identifier_rejects_empty() {
    assert!(matches!(normalize_identifier(" \n "), Err(CliError::EmptyId)));
    assert_eq!(normalize_identifier("  ABC123  ").unwrap(), "abc123");
}

#[test]
fn parse_record_id_rejects_garbage() {
    assert!(matches!(
        parse_record_id("not-a-uuid"),
        Err(CliError::InvalidId(_))
    ));
    assert!(parse_record_id("11111111-1111-7111-8111-111111111111").is_ok());
}

#[test]
fn text_preview_truncates_with_ellipsis() {
    let preview = text_preview("This is a very long sentence that should be shortened", 20);
    assert_eq!(preview, "This is a very lo...");
    assert_eq!(text_preview("two\n  lines", 20), "two lines");
}

#[test]
fn resolve_db_path_prefers_cli_flag() {
    let explicit = PathBuf::from("/tmp/explicit.db");
    assert_eq!(resolve_db_path(Some(explicit.clone())), explicit);
}

#[test]
fn cli_parses_multi_word_board_rename() {
    let cli = Cli::try_parse_from(["blink", "board", "rename", "0190", "Summer", "trip"]).unwrap();
    match cli.command {
        Commands::Board {
            command: BoardCommands::Rename { id, name },
        } => {
            assert_eq!(id, "0190");
            assert_eq!(name, vec!["Summer".to_string(), "trip".to_string()]);
        }
        _ => panic!("expected board rename"),
    }
}

#[test]
fn cli_parses_media_list_filter_and_global_db_path() {
    let cli = Cli::try_parse_from([
        "blink", "media", "list", "0190", "--kind", "image", "--json", "--db-path", "/tmp/x.db",
    ])
    .unwrap();
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/x.db")));
    match cli.command {
        Commands::Media {
            command: MediaCommands::List { board, kind, json },
        } => {
            assert_eq!(board, "0190");
            assert_eq!(kind, Some(KindArg::Image));
            assert!(json);
        }
        _ => panic!("expected media list"),
    }
}

#[test]
fn cli_requires_paths_for_image_uploads() {
    assert!(Cli::try_parse_from(["blink", "media", "add-image", "0190"]).is_err());
}

#[test]
fn kind_arg_maps_to_media_kind() {
    assert_eq!(MediaKind::from(KindArg::Text), MediaKind::Text);
    assert_eq!(MediaKind::from(KindArg::File), MediaKind::File);
}

#[test]
fn completions_name_the_blink_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("blink"));
}

#[test]
fn run_completions_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blink.fish");

    run_completions(CompletionShell::Fish, Some(&path)).unwrap();
    assert!(!std::fs::read(&path).unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_board_supports_exact_and_prefix_id() {
    let (_dir, db_path) = test_db();
    let service = open_service(&db_path).await.unwrap();
    let board = service.boards().create().await.unwrap();
    let other = service.boards().create().await.unwrap();

    let full_id = board.id.to_string();
    let by_exact = resolve_board(&full_id, &service).await.unwrap();
    assert_eq!(by_exact.id, board.id);

    let unique_prefix = &full_id[..full_id.len() - 1];
    let by_prefix = resolve_board(unique_prefix, &service).await.unwrap();
    assert_eq!(by_prefix.id, board.id);

    // Ids created moments apart share their leading timestamp digits.
    let shared_prefix = &other.id.to_string()[..4];
    assert!(matches!(
        resolve_board(shared_prefix, &service).await.unwrap_err(),
        CliError::AmbiguousId(_)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_board_and_media_reject_missing_ids() {
    let (_dir, db_path) = test_db();
    let service = open_service(&db_path).await.unwrap();

    assert!(matches!(
        resolve_board("ffffffff", &service).await.unwrap_err(),
        CliError::BoardNotFound(_)
    ));
    assert!(matches!(
        resolve_media("11111111-1111-7111-8111-111111111111", &service)
            .await
            .unwrap_err(),
        CliError::MediaNotFound(_)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn media_lines_put_texts_before_files_and_links() {
    let (dir, db_path) = test_db();
    let service = open_service(&db_path).await.unwrap();
    let board = service.boards().create().await.unwrap();

    let doc = dir.path().join("plan.pdf");
    std::fs::write(&doc, b"%PDF-1.4").unwrap();
    service
        .media()
        .save_link(board.id, "https://example.com")
        .await
        .unwrap();
    service.media().save_file(board.id, &doc).await.unwrap();
    service.media().save_text(board.id, "hello").await.unwrap();

    let items = service.media().fetch_all(board.id, None).await.unwrap();
    let lines = format_media_lines(&items);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("text   hello"));
    assert!(lines[1].contains("file   plan.pdf (application/pdf, 8 bytes)"));
    assert!(lines[2].contains("link   https://example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn media_list_item_serializes_kinds_and_assets() {
    let (dir, db_path) = test_db();
    let service = open_service(&db_path).await.unwrap();
    let board = service.boards().create().await.unwrap();

    let doc = dir.path().join("notes.txt");
    std::fs::write(&doc, b"hi").unwrap();
    let item = service.media().save_file(board.id, &doc).await.unwrap();

    let json = serde_json::to_value(media_to_list_item(&item)).unwrap();
    assert_eq!(json["kinds"], serde_json::json!(["file"]));
    assert_eq!(json["files"][0]["file_name"], "notes.txt");
    assert_eq!(json["files"][0]["size_bytes"], 2);
    assert_eq!(json["board"], board.id.to_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn content_survives_reopening_the_database() {
    let (_dir, db_path) = test_db();
    let board = {
        let service = open_service(&db_path).await.unwrap();
        let board = service.boards().create().await.unwrap();
        service.boards().rename(board.id, "Recipes").await.unwrap();
        service.media().save_text(board.id, "pancakes").await.unwrap();
        service
            .media()
            .save_link(board.id, "https://example.com/syrup")
            .await
            .unwrap();
        board
    };

    let service = open_service(&db_path).await.unwrap();
    let resolved = resolve_board(&board.id.to_string(), &service).await.unwrap();
    assert_eq!(resolved.name, "Recipes");

    let items = service.media().fetch_all(board.id, None).await.unwrap();
    assert_eq!(
        blink_core::models::snippets(&items),
        vec!["pancakes", "https://example.com/syrup"]
    );
}
