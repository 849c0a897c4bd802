//! In-process view of the boards and media fetched from the record store.
//!
//! The stores mutate the mirror only after a remote call succeeds. Every
//! mutation that changes state advances a version number, which is published
//! on a watch channel so presentation code can re-read a snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::models::{Board, MediaItem};
use crate::records::RecordId;

/// Owned copy of the mirror at one version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorSnapshot {
    pub version: u64,
    pub boards: Vec<Board>,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Default)]
struct MirrorState {
    version: u64,
    boards: Vec<Board>,
    media: Vec<MediaItem>,
}

#[derive(Debug)]
struct MirrorInner {
    state: Mutex<MirrorState>,
    versions: watch::Sender<u64>,
}

/// Ordered board and media lists shared between stores.
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    inner: Arc<MirrorInner>,
}

impl Default for LocalMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalMirror {
    #[must_use]
    pub fn new() -> Self {
        let (versions, _) = watch::channel(0);
        Self {
            inner: Arc::new(MirrorInner {
                state: Mutex::new(MirrorState::default()),
                versions,
            }),
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> MirrorSnapshot {
        let state = self.inner.state.lock().await;
        MirrorSnapshot {
            version: state.version,
            boards: state.boards.clone(),
            media: state.media.clone(),
        }
    }

    /// Receiver that observes every published version.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.versions.subscribe()
    }

    pub async fn boards(&self) -> Vec<Board> {
        self.inner.state.lock().await.boards.clone()
    }

    pub async fn media(&self) -> Vec<MediaItem> {
        self.inner.state.lock().await.media.clone()
    }

    /// Append a board unless one with the same id is present.
    pub async fn insert_board(&self, board: Board) -> bool {
        self.mutate(|state| {
            if state.boards.iter().any(|existing| existing.id == board.id) {
                false
            } else {
                state.boards.push(board);
                true
            }
        })
        .await
    }

    /// Set the name of a mirrored board.
    pub async fn rename_board(&self, id: RecordId, name: &str) -> bool {
        self.mutate(|state| {
            match state.boards.iter_mut().find(|board| board.id == id) {
                Some(board) if board.name != name => {
                    board.name = name.to_string();
                    true
                }
                _ => false,
            }
        })
        .await
    }

    /// Drop every mirrored media item.
    pub async fn clear_media(&self) -> bool {
        self.mutate(|state| {
            if state.media.is_empty() {
                false
            } else {
                state.media.clear();
                true
            }
        })
        .await
    }

    /// Replace the whole media list in one step.
    ///
    /// Later duplicates of an id are dropped. Publishes at most one version.
    pub async fn replace_all_media(&self, items: Vec<MediaItem>) -> bool {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect::<Vec<_>>();
        self.mutate(|state| {
            if state.media == items {
                false
            } else {
                state.media = items;
                true
            }
        })
        .await
    }

    /// Append a media item unless one with the same id is present.
    pub async fn insert_media(&self, item: MediaItem) -> bool {
        self.mutate(|state| {
            if state.media.iter().any(|existing| existing.id == item.id) {
                false
            } else {
                state.media.push(item);
                true
            }
        })
        .await
    }

    /// Swap in a newer copy of a mirrored media item, keeping its position.
    pub async fn replace_media(&self, item: MediaItem) -> bool {
        self.mutate(|state| {
            match state.media.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) if *existing != item => {
                    *existing = item;
                    true
                }
                _ => false,
            }
        })
        .await
    }

    /// Remove a media item by id.
    pub async fn remove_media(&self, id: RecordId) -> bool {
        self.mutate(|state| {
            let before = state.media.len();
            state.media.retain(|item| item.id != id);
            state.media.len() != before
        })
        .await
    }

    async fn mutate(&self, apply: impl FnOnce(&mut MirrorState) -> bool) -> bool {
        let mut state = self.inner.state.lock().await;
        let changed = apply(&mut *state);
        if changed {
            state.version += 1;
            // Published under the lock so receivers never see versions go backwards.
            self.inner.versions.send_replace(state.version);
        }
        changed
    }
}
