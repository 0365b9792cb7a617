use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to write asset: {0}")]
    Io(#[from] std::io::Error),
}

// Asset-store capability: takes a binary blob, returns a durable
// reference usable as an event's `image` field.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn store(
        &self,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, AssetError>;
}

// Local-disk implementation; files land under the configured upload
// directory and are served back at `{base_url}/{name}`.
pub struct FsAssetStore {
    dir: PathBuf,
    base_url: String,
}

impl FsAssetStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn store(
        &self,
        filename: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<String, AssetError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = stored_name(filename);
        tokio::fs::write(self.dir.join(&name), bytes).await?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), name))
    }
}

// Uuid prefix keeps names collision-free even for identical uploads
fn stored_name(filename: &str) -> String {
    let mut prefix = Uuid::new_v4().simple().to_string();
    prefix.truncate(8);
    format!("{}-{}", prefix, sanitize_filename(filename))
}

fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

// Test fake; holds blobs in memory and hands out listing-shaped URLs.
#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryAssetStore {
    pub fn stored_count(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn store(
        &self,
        filename: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<String, AssetError> {
        let name = stored_name(filename);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), bytes.to_vec());
        Ok(format!("/uploads/{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("poster.png"), "poster.png");
        assert_eq!(sanitize_filename("my poster (1).png"), "my-poster--1-.png");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[tokio::test]
    async fn memory_store_returns_uploads_reference() {
        let store = InMemoryAssetStore::default();
        let url = store.store("poster.png", "image/png", &[1, 2, 3]).await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("poster.png"));
        assert_eq!(store.stored_count(), 1);
    }
}
