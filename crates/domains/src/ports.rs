//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//!
//! `MetadataStore` models a key-value store offering three primitives:
//! an ordered set (score-ranked members), a plain set, and a field→value
//! map. Every method maps to exactly one store command and is atomic on
//! its own; multi-step operations built on top are *not* transactional.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;

use crate::error::Result;
use crate::models::{MediaDeleteStatus, StoredMedia};

/// Metadata persistence contract for the active/disabled/day-rule keys.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MetadataStore: Send + Sync {
    // Ordered-set operations
    /// Insert `member` at `score`; returns 1 if the member was new.
    async fn ranked_insert(&self, key: &str, score: u64, member: &str) -> Result<u64>;
    /// Batch insert/overwrite; returns the number of added or re-scored members.
    async fn ranked_insert_many(&self, key: &str, entries: &[(u64, String)]) -> Result<u64>;
    /// Returns the number of members actually removed (0 or 1).
    async fn ranked_remove(&self, key: &str, member: &str) -> Result<u64>;
    /// All members with their scores, ascending by score.
    async fn ranked_entries(&self, key: &str) -> Result<Vec<(String, u64)>>;
    async fn ranked_len(&self, key: &str) -> Result<u64>;
    async fn ranked_score(&self, key: &str, member: &str) -> Result<Option<u64>>;

    // Set operations
    async fn set_insert(&self, key: &str, member: &str) -> Result<u64>;
    async fn set_remove(&self, key: &str, member: &str) -> Result<u64>;
    async fn set_contains(&self, key: &str, member: &str) -> Result<bool>;
    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    // Map operations
    async fn map_put(&self, key: &str, field: &str, value: &str) -> Result<()>;
    async fn map_remove(&self, key: &str, field: &str) -> Result<u64>;
    async fn map_entries(&self, key: &str) -> Result<HashMap<String, String>>;

    // Whole-key operations
    async fn delete_key(&self, key: &str) -> Result<u64>;
    /// Schedule the whole key to vanish at `unix_secs`. Returns false if the
    /// key does not exist.
    async fn expire_key_at(&self, key: &str, unix_secs: i64) -> Result<bool>;
}

/// Remote object-store contract for banner/flyer images.
///
/// Slow and fallible (network call). `delete` distinguishes "the store
/// answered not-found" from a transport failure: the former is a normal
/// [`MediaDeleteStatus::NotFound`], the latter an `Err`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload `data` under a folder, tagged for bulk deletion. Returns the
    /// stable public url and the store-side asset id.
    async fn upload(
        &self,
        data: Bytes,
        content_type: Mime,
        folder: &str,
        tag: &str,
    ) -> Result<StoredMedia>;

    async fn delete(&self, asset_id: &str) -> Result<MediaDeleteStatus>;

    /// Bulk delete of everything uploaded under `tag`; returns a count when
    /// the store reports one.
    async fn delete_by_tag(&self, tag: &str) -> Result<u64>;
}
