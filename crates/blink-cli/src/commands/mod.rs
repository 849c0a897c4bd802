pub mod board;
pub mod common;
pub mod completions;
pub mod media;
pub mod snippets;
