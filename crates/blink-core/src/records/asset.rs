//! Binary assets attached to records.

use std::fmt;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::util::content_type_for_extension;

/// A blob carried by an asset-list field.
#[derive(Clone, PartialEq, Eq)]
pub struct Asset {
    /// File name shown to the user.
    pub file_name: String,
    /// Content MIME type.
    pub content_type: String,
    /// SHA-256 of `bytes`, hex encoded.
    pub content_hash: String,
    /// Raw asset bytes.
    pub bytes: Vec<u8>,
}

impl Asset {
    /// Build an asset from in-memory bytes.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let file_name = file_name.into().trim().to_string();
        let content_type = content_type.into().trim().to_string();

        if file_name.is_empty() {
            return Err(Error::InvalidInput(
                "Asset file name cannot be empty".to_string(),
            ));
        }
        if content_type.is_empty() {
            return Err(Error::InvalidInput(
                "Asset content type cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            file_name,
            content_type,
            content_hash: content_hash(&bytes),
            bytes,
        })
    }

    /// Read an asset from disk, guessing the content type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("Asset path has no file name: {}", path.display()))
            })?
            .to_string();
        Self::from_path_named(path, file_name).await
    }

    /// Read an asset from disk under an explicit display name.
    pub async fn from_path_named(path: &Path, file_name: impl Into<String>) -> Result<Self> {
        let file_name = file_name.into();
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|extension| extension.to_str());
        let content_type = content_type_for_extension(extension);
        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, content_type, bytes)
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the content type names an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Asset")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("content_hash", &self.content_hash)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// SHA-256 of `bytes`, hex encoded.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
