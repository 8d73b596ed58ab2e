//! The flyer ("encarte") shelf: a single membership set with optional
//! nightly expiry. No ordering, no day rules; lifecycle is add → read →
//! destroy, per item or in bulk.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use mime::Mime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use domains::{
    AppError, DestroyOutcome, MediaDeleteStatus, MediaStore, MetadataStore, Result, SweepReport,
};

use crate::asset_id::extract_asset_id;
use crate::clock::next_midnight_after;
use crate::media_ops::delete_backing_asset;
use crate::registry::MediaPlacement;

/// How flyers leave the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlyerExpiry {
    /// The whole collection key expires at the next display-region midnight;
    /// the TTL is recomputed on every insert, so the entire collection
    /// vanishes atomically with no explicit deletes.
    MidnightTtl,
    /// No TTL; flyers persist until swept or destroyed individually.
    SweepOnly,
}

pub struct FlyerShelf {
    store: Arc<dyn MetadataStore>,
    media: Arc<dyn MediaStore>,
    key: String,
    placement: MediaPlacement,
    expiry: FlyerExpiry,
}

impl FlyerShelf {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        media: Arc<dyn MediaStore>,
        namespace: &str,
        placement: MediaPlacement,
        expiry: FlyerExpiry,
    ) -> Self {
        Self {
            store,
            media,
            key: format!("{namespace}:items"),
            placement,
            expiry,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Upload the payload and add its url to the shelf. `now` drives the
    /// midnight-TTL computation and is passed in by the caller.
    pub async fn add(&self, data: Bytes, content_type: Mime, now: DateTime<Utc>) -> Result<String> {
        if data.is_empty() {
            return Err(AppError::Validation("empty upload payload".into()));
        }
        let stored = self
            .media
            .upload(data, content_type, &self.placement.folder, &self.placement.tag)
            .await?;
        self.store.set_insert(&self.key, &stored.url).await?;
        if self.expiry == FlyerExpiry::MidnightTtl {
            self.store
                .expire_key_at(&self.key, next_midnight_after(now))
                .await?;
        }
        info!(url = %stored.url, "flyer added");
        Ok(stored.url)
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.store.set_members(&self.key).await
    }

    /// Ad-hoc single-flyer removal, valid under either expiry policy.
    pub async fn destroy(&self, url: &str) -> Result<DestroyOutcome> {
        let removed = self.store.set_remove(&self.key, url).await?;
        if removed == 0 {
            return Err(AppError::NotFound("flyer", url.to_string()));
        }
        let media = delete_backing_asset(self.media.as_ref(), url, &self.placement.folder).await;
        info!(url, media = ?media, "flyer destroyed");
        Ok(DestroyOutcome { removed, media })
    }

    /// Bulk eviction: delete every member's backing asset, isolating
    /// per-item failures, then drop the whole collection key. Never
    /// fail-fast on one bad record.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let members = self.store.set_members(&self.key).await?;
        let mut report = SweepReport::default();
        for url in &members {
            let Some(asset_id) = extract_asset_id(url, &self.placement.folder) else {
                report.skipped += 1;
                continue;
            };
            match self.media.delete(&asset_id).await {
                Ok(MediaDeleteStatus::Deleted) | Ok(MediaDeleteStatus::NotFound) => {
                    report.deleted += 1
                }
                Ok(MediaDeleteStatus::Other(detail)) => {
                    warn!(%url, %detail, "flyer asset delete refused");
                    report.errors += 1;
                }
                Err(err) => {
                    warn!(%url, error = %err, "flyer asset delete failed");
                    report.errors += 1;
                }
            }
        }
        self.store.delete_key(&self.key).await?;
        info!(?report, scanned = members.len(), "flyer sweep finished");
        Ok(report)
    }
}
