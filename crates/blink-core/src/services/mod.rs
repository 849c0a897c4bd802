//! Board and media operations over a [`RecordStore`].

mod board_store;
mod media_store;

use std::sync::Arc;

pub use board_store::BoardStore;
pub use media_store::MediaStore;

#[cfg(test)]
pub(crate) use media_store::tests::assert_each_kind_reads_back;

use crate::config::SyncSettings;
use crate::mirror::LocalMirror;
use crate::records::RecordStore;

/// Board and media stores sharing one record store and one mirror.
pub struct BlinkService<S> {
    boards: BoardStore<S>,
    media: MediaStore<S>,
    mirror: LocalMirror,
}

impl<S> Clone for BlinkService<S> {
    fn clone(&self) -> Self {
        Self {
            boards: self.boards.clone(),
            media: self.media.clone(),
            mirror: self.mirror.clone(),
        }
    }
}

impl<S: RecordStore> BlinkService<S> {
    pub fn new(records: S, settings: SyncSettings) -> Self {
        let records = Arc::new(records);
        let settings = Arc::new(settings);
        let mirror = LocalMirror::new();
        Self {
            boards: BoardStore::new(Arc::clone(&records), mirror.clone(), Arc::clone(&settings)),
            media: MediaStore::new(records, mirror.clone(), settings),
            mirror,
        }
    }

    #[must_use]
    pub const fn boards(&self) -> &BoardStore<S> {
        &self.boards
    }

    #[must_use]
    pub const fn media(&self) -> &MediaStore<S> {
        &self.media
    }

    #[must_use]
    pub const fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }
}
