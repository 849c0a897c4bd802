use std::path::PathBuf;

use blink_core::MediaKind;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "blink")]
#[command(about = "Collect text, links, images and files into boards")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, list and rename boards
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Add, list and remove board content
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },
    /// Print every link and text snippet on a board, one per line
    Snippets {
        /// Board ID or unique ID prefix
        board: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Create an empty board
    #[command(alias = "new")]
    Create,
    /// List boards
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a board
    Rename {
        /// Board ID or unique ID prefix
        id: String,
        /// New board name
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Write a board's cover image
    Thumbnail {
        /// Board ID or unique ID prefix
        id: String,
        /// Output path (defaults to `<board id>.<ext>` in the current directory)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum MediaCommands {
    /// List a board's content, images first
    List {
        /// Board ID or unique ID prefix
        board: String,
        /// Only items holding this kind of content
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a text snippet (reads piped stdin when no text is given)
    AddText {
        /// Board ID or unique ID prefix
        board: String,
        /// Snippet text
        text: Vec<String>,
    },
    /// Add an http(s) link
    AddLink {
        /// Board ID or unique ID prefix
        board: String,
        /// Link URL
        url: String,
    },
    /// Add images, one item per image
    AddImage {
        /// Board ID or unique ID prefix
        board: String,
        /// Image files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Add documents, one item per file
    AddFile {
        /// Board ID or unique ID prefix
        board: String,
        /// Document files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete a media item
    Delete {
        /// Media item ID
        id: String,
    },
    /// Remove one text snippet from a media item
    DeleteText {
        /// Media item ID
        id: String,
        /// Snippet text to remove
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Remove an image from a media item
    DeleteImage {
        /// Media item ID
        id: String,
        /// Image file with the same content
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Text,
    Link,
    Image,
    File,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => Self::Text,
            KindArg::Link => Self::Link,
            KindArg::Image => Self::Image,
            KindArg::File => Self::File,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
