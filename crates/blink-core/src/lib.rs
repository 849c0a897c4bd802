//! blink-core - Core library for Blink
//!
//! Boards and media items live as typed records in a record store. This crate
//! holds the models, the [`RecordStore`] abstraction with its memory and
//! libSQL backends, the board and media stores that map user intent onto
//! record operations, and the [`LocalMirror`] those stores keep in step.

pub mod config;
pub mod db;
pub mod error;
pub mod mirror;
pub mod models;
pub mod records;
pub mod services;
pub mod storage;
pub mod util;

pub use config::SyncSettings;
pub use db::LibSqlRecordStore;
pub use error::{Error, Result};
pub use mirror::{LocalMirror, MirrorSnapshot};
pub use models::{Board, MediaDraft, MediaItem, MediaKind};
pub use records::{Asset, MemoryRecordStore, Predicate, Record, RecordId, RecordStore};
pub use services::{BlinkService, BoardStore, MediaStore};
