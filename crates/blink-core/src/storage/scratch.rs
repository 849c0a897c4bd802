//! Short-lived files staged on disk before an upload.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::Result;

/// A uniquely named file in the scratch directory, removed on drop.
///
/// Removal runs on every path out of the owning scope, so a failed upload
/// never leaves the staged copy behind.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Write `bytes` to a new scratch file with the given extension.
    pub async fn write(dir: &Path, extension: &str, bytes: &[u8]) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let file = Self {
            path: dir.join(unique_name(Some(extension))),
        };
        tokio::fs::write(&file.path, bytes).await?;
        tracing::debug!(path = %file.path.display(), size = bytes.len(), "Wrote scratch file");
        Ok(file)
    }

    /// Copy `source` into a new scratch file, keeping its extension.
    pub async fn copy_from(dir: &Path, source: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let extension = source.extension().and_then(|ext| ext.to_str());
        let file = Self {
            path: dir.join(unique_name(extension)),
        };
        tokio::fs::copy(source, &file.path).await?;
        tracing::debug!(
            source = %source.display(),
            path = %file.path.display(),
            "Copied file into scratch"
        );
        Ok(file)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => tracing::warn!(
                path = %self.path.display(),
                "Failed to remove scratch file: {error}"
            ),
        }
    }
}

fn unique_name(extension: Option<&str>) -> String {
    let stem = Uuid::now_v7();
    match extension.filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn write_creates_file_and_drop_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let scratch_dir = dir.path().join("nested");

        let file = ScratchFile::write(&scratch_dir, "jpg", b"payload").await.unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");

        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn copy_from_keeps_extension_and_leaves_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("report.PDF");
        std::fs::write(&source, b"%PDF").unwrap();

        let file = ScratchFile::copy_from(&dir.path().join("scratch"), &source)
            .await
            .unwrap();
        assert_eq!(file.path().extension().and_then(|ext| ext.to_str()), Some("PDF"));
        assert_eq!(std::fs::read(file.path()).unwrap(), b"%PDF");

        drop(file);
        assert!(source.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn copy_from_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ScratchFile::copy_from(dir.path(), &dir.path().join("missing.txt")).await;
        assert!(result.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drop_tolerates_already_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = ScratchFile::write(dir.path(), "bin", b"x").await.unwrap();
        std::fs::remove_file(file.path()).unwrap();
        drop(file);
    }

    #[test]
    fn unique_names_differ() {
        assert_ne!(unique_name(Some("jpg")), unique_name(Some("jpg")));
        assert!(!unique_name(None).contains('.'));
    }
}
