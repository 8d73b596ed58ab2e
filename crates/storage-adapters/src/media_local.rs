//! Local filesystem implementation of the `MediaStore` port, for development
//! and single-host deployments.
//!
//! Content-addressable: files are named by the SHA-256 hash of their bytes,
//! which deduplicates repeated uploads for free. The tag is treated as the
//! folder here, so `delete_by_tag` is a directory removal.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use sha2::{Digest, Sha256};
use tokio::fs;

use domains::{AppError, MediaDeleteStatus, MediaStore, Result, StoredMedia};

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/media")
    root_path: PathBuf,
    /// Public URL prefix the dev server exposes `root_path` under.
    url_prefix: String,
}

fn io_err(what: &str, err: std::io::Error) -> AppError {
    AppError::Upstream(format!("local media {what}: {err}"))
}

fn extension_for(content_type: &Mime) -> &'static str {
    mime_guess::get_mime_extensions(content_type)
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin")
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload using its SHA-256 hash as the filename.
    async fn upload(
        &self,
        data: Bytes,
        content_type: Mime,
        folder: &str,
        _tag: &str,
    ) -> Result<StoredMedia> {
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());
        let ext = extension_for(&content_type);

        let dir = self.root_path.join(folder);
        fs::create_dir_all(&dir).await.map_err(|e| io_err("mkdir", e))?;
        let target = dir.join(format!("{hash}.{ext}"));
        if fs::metadata(&target).await.is_err() {
            fs::write(&target, &data).await.map_err(|e| io_err("write", e))?;
        }

        Ok(StoredMedia {
            url: format!("{}/{folder}/{hash}.{ext}", self.url_prefix),
            asset_id: format!("{folder}/{hash}"),
        })
    }

    /// Removes the file whose stem matches the asset id, whatever its
    /// extension turned out to be.
    async fn delete(&self, asset_id: &str) -> Result<MediaDeleteStatus> {
        let Some((folder, stem)) = asset_id.rsplit_once('/') else {
            return Ok(MediaDeleteStatus::Other(format!(
                "asset id without folder: {asset_id}"
            )));
        };
        let dir = self.root_path.join(folder);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(MediaDeleteStatus::NotFound)
            }
            Err(err) => return Err(io_err("read dir", err)),
        };

        let mut removed = false;
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err("read dir", e))? {
            let path = entry.path();
            let matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s == stem);
            if matches {
                fs::remove_file(&path).await.map_err(|e| io_err("remove", e))?;
                removed = true;
            }
        }
        Ok(if removed {
            MediaDeleteStatus::Deleted
        } else {
            MediaDeleteStatus::NotFound
        })
    }

    /// The tag doubles as the folder, so this is a directory removal.
    async fn delete_by_tag(&self, tag: &str) -> Result<u64> {
        let dir = self.root_path.join(tag);
        let mut count = 0u64;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(io_err("read dir", err)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err("read dir", e))? {
            if entry.path().is_file() {
                count += 1;
            }
        }
        fs::remove_dir_all(&dir).await.map_err(|e| io_err("remove dir", e))?;
        Ok(count)
    }
}
