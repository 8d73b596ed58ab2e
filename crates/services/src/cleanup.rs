//! Scheduled reconciliation between the metadata keys and the media store.
//!
//! Two configuration-selectable shapes: a full wipe that resets the whole
//! banner domain, and a sweep that only drains the disabled set. The cron
//! trigger itself is external; this is just the operation it invokes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use domains::{MediaDeleteStatus, MediaStore, MetadataStore, Result, SweepReport};

use crate::asset_id::extract_asset_id;
use crate::registry::{MediaPlacement, RegistryKeys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// Reset everything daily: one bulk delete-by-tag on the media store,
    /// then drop all three metadata keys.
    FullWipe,
    /// Evict only what admins already disabled, item by item.
    DisabledSweep,
}

pub struct CleanupService {
    store: Arc<dyn MetadataStore>,
    media: Arc<dyn MediaStore>,
    keys: RegistryKeys,
    placement: MediaPlacement,
    policy: CleanupPolicy,
}

impl CleanupService {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        media: Arc<dyn MediaStore>,
        namespace: &str,
        placement: MediaPlacement,
        policy: CleanupPolicy,
    ) -> Self {
        Self {
            store,
            media,
            keys: RegistryKeys::new(namespace),
            placement,
            policy,
        }
    }

    pub fn policy(&self) -> CleanupPolicy {
        self.policy
    }

    pub async fn run(&self) -> Result<SweepReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("cleanup", %run_id, policy = ?self.policy);
        async {
            match self.policy {
                CleanupPolicy::FullWipe => self.full_wipe().await,
                CleanupPolicy::DisabledSweep => self.disabled_sweep().await,
            }
        }
        .instrument(span)
        .await
    }

    async fn full_wipe(&self) -> Result<SweepReport> {
        let deleted = self.media.delete_by_tag(&self.placement.tag).await?;
        self.store.delete_key(&self.keys.active).await?;
        self.store.delete_key(&self.keys.days).await?;
        self.store.delete_key(&self.keys.disabled).await?;
        info!(deleted, "full wipe finished");
        Ok(SweepReport {
            deleted,
            errors: 0,
            skipped: 0,
        })
    }

    /// Drain the disabled set one member at a time. A failure on one item is
    /// tallied and the sweep continues; it never aborts the remainder.
    async fn disabled_sweep(&self) -> Result<SweepReport> {
        let members = self.store.set_members(&self.keys.disabled).await?;
        let mut report = SweepReport::default();
        for url in &members {
            if let Err(err) = self.store.set_remove(&self.keys.disabled, url).await {
                warn!(%url, error = %err, "could not drop disabled entry");
                report.errors += 1;
                continue;
            }
            let Some(asset_id) = extract_asset_id(url, &self.placement.folder) else {
                report.skipped += 1;
                continue;
            };
            match self.media.delete(&asset_id).await {
                // the store already lost the asset: still a successful evict
                Ok(MediaDeleteStatus::Deleted) | Ok(MediaDeleteStatus::NotFound) => {
                    report.deleted += 1
                }
                Ok(MediaDeleteStatus::Other(detail)) => {
                    warn!(%url, %detail, "asset delete refused");
                    report.errors += 1;
                }
                Err(err) => {
                    warn!(%url, error = %err, "asset delete failed");
                    report.errors += 1;
                }
            }
        }
        info!(?report, scanned = members.len(), "disabled sweep finished");
        Ok(report)
    }
}
