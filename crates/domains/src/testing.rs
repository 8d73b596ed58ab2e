//! In-memory fakes of the store ports for external test crates.
//!
//! `MemoryMetadataStore` keeps the three primitives in plain maps and honors
//! `expire_key_at` against a *settable* clock, so TTL behavior can be tested
//! without waiting for wall time. `MemoryMediaStore` records uploads and
//! supports injected failures for sweep-isolation tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;

use crate::error::{AppError, Result};
use crate::models::{MediaDeleteStatus, StoredMedia};
use crate::ports::{MediaStore, MetadataStore};

#[derive(Default)]
struct Keyspace {
    ranked: HashMap<String, HashMap<String, u64>>,
    sets: HashMap<String, HashSet<String>>,
    maps: HashMap<String, HashMap<String, String>>,
    expiries: HashMap<String, i64>,
}

impl Keyspace {
    fn drop_key(&mut self, key: &str) -> bool {
        let mut hit = self.ranked.remove(key).is_some();
        hit |= self.sets.remove(key).is_some();
        hit |= self.maps.remove(key).is_some();
        self.expiries.remove(key);
        hit
    }

    fn has_key(&self, key: &str) -> bool {
        self.ranked.contains_key(key) || self.sets.contains_key(key) || self.maps.contains_key(key)
    }

    fn purge_expired(&mut self, now: i64) {
        let due: Vec<String> = self
            .expiries
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(k, _)| k.clone())
            .collect();
        for key in due {
            self.drop_key(&key);
        }
    }
}

/// In-memory [`MetadataStore`] with a settable clock for expiry tests.
pub struct MemoryMetadataStore {
    inner: Mutex<Keyspace>,
    now: AtomicI64,
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Keyspace::default()),
            now: AtomicI64::new(i64::MIN),
        }
    }
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the fake's clock. Keys whose expiry is at or before the new time
    /// vanish on the next access, like a real store's lazy expiry.
    pub fn set_now(&self, unix_secs: i64) {
        self.now.store(unix_secs, Ordering::SeqCst);
    }

    /// Expiry timestamp currently attached to `key`, if any.
    pub fn expiry_of(&self, key: &str) -> Option<i64> {
        self.inner.lock().expect("keyspace lock").expiries.get(key).copied()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Keyspace) -> T) -> T {
        let mut ks = self.inner.lock().expect("keyspace lock");
        ks.purge_expired(self.now.load(Ordering::SeqCst));
        f(&mut ks)
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn ranked_insert(&self, key: &str, score: u64, member: &str) -> Result<u64> {
        Ok(self.with(|ks| {
            let set = ks.ranked.entry(key.to_string()).or_default();
            match set.insert(member.to_string(), score) {
                None => 1,
                Some(_) => 0,
            }
        }))
    }

    async fn ranked_insert_many(&self, key: &str, entries: &[(u64, String)]) -> Result<u64> {
        Ok(self.with(|ks| {
            let set = ks.ranked.entry(key.to_string()).or_default();
            let mut changed = 0;
            for (score, member) in entries {
                if set.insert(member.clone(), *score) != Some(*score) {
                    changed += 1;
                }
            }
            changed
        }))
    }

    async fn ranked_remove(&self, key: &str, member: &str) -> Result<u64> {
        Ok(self.with(|ks| {
            ks.ranked
                .get_mut(key)
                .and_then(|set| set.remove(member))
                .map(|_| 1)
                .unwrap_or(0)
        }))
    }

    async fn ranked_entries(&self, key: &str) -> Result<Vec<(String, u64)>> {
        Ok(self.with(|ks| {
            let mut entries: Vec<(String, u64)> = ks
                .ranked
                .get(key)
                .map(|set| set.iter().map(|(m, s)| (m.clone(), *s)).collect())
                .unwrap_or_default();
            // score order, member-lexicographic tie-break
            entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            entries
        }))
    }

    async fn ranked_len(&self, key: &str) -> Result<u64> {
        Ok(self.with(|ks| ks.ranked.get(key).map(|set| set.len() as u64).unwrap_or(0)))
    }

    async fn ranked_score(&self, key: &str, member: &str) -> Result<Option<u64>> {
        Ok(self.with(|ks| ks.ranked.get(key).and_then(|set| set.get(member).copied())))
    }

    async fn set_insert(&self, key: &str, member: &str) -> Result<u64> {
        Ok(self.with(|ks| {
            let set = ks.sets.entry(key.to_string()).or_default();
            u64::from(set.insert(member.to_string()))
        }))
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<u64> {
        Ok(self.with(|ks| {
            ks.sets
                .get_mut(key)
                .map(|set| u64::from(set.remove(member)))
                .unwrap_or(0)
        }))
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool> {
        Ok(self.with(|ks| ks.sets.get(key).is_some_and(|set| set.contains(member))))
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.with(|ks| {
            let mut members: Vec<String> = ks
                .sets
                .get(key)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            members.sort();
            members
        }))
    }

    async fn map_put(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.with(|ks| {
            ks.maps
                .entry(key.to_string())
                .or_default()
                .insert(field.to_string(), value.to_string());
        });
        Ok(())
    }

    async fn map_remove(&self, key: &str, field: &str) -> Result<u64> {
        Ok(self.with(|ks| {
            ks.maps
                .get_mut(key)
                .and_then(|map| map.remove(field))
                .map(|_| 1)
                .unwrap_or(0)
        }))
    }

    async fn map_entries(&self, key: &str) -> Result<HashMap<String, String>> {
        Ok(self.with(|ks| ks.maps.get(key).cloned().unwrap_or_default()))
    }

    async fn delete_key(&self, key: &str) -> Result<u64> {
        Ok(self.with(|ks| u64::from(ks.drop_key(key))))
    }

    async fn expire_key_at(&self, key: &str, unix_secs: i64) -> Result<bool> {
        Ok(self.with(|ks| {
            if ks.has_key(key) {
                ks.expiries.insert(key.to_string(), unix_secs);
                true
            } else {
                false
            }
        }))
    }
}

#[derive(Default)]
struct MediaState {
    /// asset_id → tag
    assets: HashMap<String, String>,
    seq: u64,
    fail_uploads: bool,
    fail_deletes: HashSet<String>,
}

/// In-memory [`MediaStore`] issuing urls in the remote store's shape
/// (`…/v<digits>/<folder>/<name>.<ext>`), so asset-id extraction round-trips.
#[derive(Default)]
pub struct MemoryMediaStore {
    state: Mutex<MediaState>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.state.lock().expect("media lock").fail_uploads = fail;
    }

    /// Make the next `delete` calls for `asset_id` fail at the transport level.
    pub fn fail_delete_of(&self, asset_id: &str) {
        self.state
            .lock()
            .expect("media lock")
            .fail_deletes
            .insert(asset_id.to_string());
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.state.lock().expect("media lock").assets.contains_key(asset_id)
    }

    pub fn asset_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .state
            .lock()
            .expect("media lock")
            .assets
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn upload_count(&self) -> u64 {
        self.state.lock().expect("media lock").seq
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(
        &self,
        _data: Bytes,
        content_type: Mime,
        folder: &str,
        tag: &str,
    ) -> Result<StoredMedia> {
        let mut state = self.state.lock().expect("media lock");
        if state.fail_uploads {
            return Err(AppError::Upstream("injected upload failure".into()));
        }
        state.seq += 1;
        let asset_id = format!("{folder}/asset-{}", state.seq);
        let url = format!(
            "https://media.invalid/raw/upload/v1690000000/{asset_id}.{}",
            content_type.subtype()
        );
        state.assets.insert(asset_id.clone(), tag.to_string());
        Ok(StoredMedia { url, asset_id })
    }

    async fn delete(&self, asset_id: &str) -> Result<MediaDeleteStatus> {
        let mut state = self.state.lock().expect("media lock");
        if state.fail_deletes.contains(asset_id) {
            return Err(AppError::Upstream(format!(
                "injected delete failure for {asset_id}"
            )));
        }
        Ok(match state.assets.remove(asset_id) {
            Some(_) => MediaDeleteStatus::Deleted,
            None => MediaDeleteStatus::NotFound,
        })
    }

    async fn delete_by_tag(&self, tag: &str) -> Result<u64> {
        let mut state = self.state.lock().expect("media lock");
        let doomed: Vec<String> = state
            .assets
            .iter()
            .filter(|(_, t)| t.as_str() == tag)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &doomed {
            state.assets.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}
