//! HTTP implementation of the `MediaStore` port.
//!
//! Speaks to a remote media API with three endpoints:
//! - `POST {base}/upload`: multipart `file` + `folder` + `tags`; answers
//!   `{"url": "...", "asset_id": "..."}`.
//! - `DELETE {base}/assets/{asset_id}`: answers `{"result": "ok"}` or
//!   `{"result": "not found"}` (a 404 status counts as not found too).
//! - `DELETE {base}/tags/{tag}`: bulk delete, answers `{"deleted": n}`.

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use reqwest::multipart;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use domains::{AppError, MediaDeleteStatus, MediaStore, Result, StoredMedia};

pub struct HttpMediaStore {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
    asset_id: String,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct TagDeleteResponse {
    #[serde(default)]
    deleted: u64,
}

fn transport_err(what: &str, err: reqwest::Error) -> AppError {
    AppError::Upstream(format!("media store {what}: {err}"))
}

impl HttpMediaStore {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(
        &self,
        data: Bytes,
        content_type: Mime,
        folder: &str,
        tag: &str,
    ) -> Result<StoredMedia> {
        let part = multipart::Part::bytes(data.to_vec())
            .file_name("upload")
            .mime_str(content_type.as_ref())
            .map_err(|err| transport_err("part", err))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string())
            .text("tags", tag.to_string());

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|err| transport_err("upload", err))?
            .error_for_status()
            .map_err(|err| transport_err("upload", err))?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| transport_err("upload response", err))?;
        debug!(url = %body.url, asset_id = %body.asset_id, "media uploaded");
        Ok(StoredMedia {
            url: body.url,
            asset_id: body.asset_id,
        })
    }

    async fn delete(&self, asset_id: &str) -> Result<MediaDeleteStatus> {
        let response = self
            .http
            .delete(format!("{}/assets/{asset_id}", self.base_url))
            .send()
            .await
            .map_err(|err| transport_err("delete", err))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(MediaDeleteStatus::NotFound);
        }
        let body: DeleteResponse = response
            .error_for_status()
            .map_err(|err| transport_err("delete", err))?
            .json()
            .await
            .map_err(|err| transport_err("delete response", err))?;
        Ok(match body.result.as_str() {
            "ok" | "deleted" => MediaDeleteStatus::Deleted,
            "not found" | "not_found" => MediaDeleteStatus::NotFound,
            other => MediaDeleteStatus::Other(other.to_string()),
        })
    }

    async fn delete_by_tag(&self, tag: &str) -> Result<u64> {
        let response = self
            .http
            .delete(format!("{}/tags/{tag}", self.base_url))
            .send()
            .await
            .map_err(|err| transport_err("tag delete", err))?
            .error_for_status()
            .map_err(|err| transport_err("tag delete", err))?;
        let body: TagDeleteResponse = response
            .json()
            .await
            .map_err(|err| transport_err("tag delete response", err))?;
        Ok(body.deleted)
    }
}
