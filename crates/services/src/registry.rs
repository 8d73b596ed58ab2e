//! The active-banner registry: the ordered, day-filtered active set and its
//! consistency rules across the metadata keys and the media store.
//!
//! Three coupled keys per item-type namespace:
//! - `<ns>:active`   ordered set, member = url, score = display position
//! - `<ns>:days`     map, url → weekday tag
//! - `<ns>:disabled` set of withheld urls
//!
//! A url lives in at most one of active/disabled. The day map is
//! supplementary and never consulted for existence. Every store command is
//! atomic on its own; the multi-step operations below are not, and a crash
//! between steps can strand an item mid-transition. That window is accepted;
//! there is no compensating rollback.

use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Datelike, NaiveDate};
use mime::Mime;
use tracing::info;

use domains::{
    ActiveBanner, AppError, DayRule, DestroyOutcome, MediaStore, MetadataStore, Result,
};

use crate::media_ops::delete_backing_asset;

/// Key names for one item-type namespace.
#[derive(Debug, Clone)]
pub struct RegistryKeys {
    pub active: String,
    pub days: String,
    pub disabled: String,
}

impl RegistryKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            active: format!("{namespace}:active"),
            days: format!("{namespace}:days"),
            disabled: format!("{namespace}:disabled"),
        }
    }
}

/// Where a registry's uploads land in the media store.
#[derive(Debug, Clone)]
pub struct MediaPlacement {
    pub folder: String,
    pub tag: String,
}

/// The carousel's domain service. Holds the injected store ports; one
/// instance per item-type namespace.
pub struct BannerRegistry {
    store: Arc<dyn MetadataStore>,
    media: Arc<dyn MediaStore>,
    keys: RegistryKeys,
    placement: MediaPlacement,
}

impl BannerRegistry {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        media: Arc<dyn MediaStore>,
        namespace: &str,
        placement: MediaPlacement,
    ) -> Self {
        Self {
            store,
            media,
            keys: RegistryKeys::new(namespace),
            placement,
        }
    }

    pub fn keys(&self) -> &RegistryKeys {
        &self.keys
    }

    pub fn placement(&self) -> &MediaPlacement {
        &self.placement
    }

    /// Next append position: the current cardinality of the active set.
    ///
    /// Read-then-write: two concurrent appends can observe the same
    /// cardinality and tie on position, with member-order tie-break.
    /// An atomic append would replace only this method.
    async fn next_position(&self) -> Result<u64> {
        self.store.ranked_len(&self.keys.active).await
    }

    /// Every active banner, ascending by position. An absent or unparsable
    /// day entry counts as `ALL`.
    pub async fn list_active(&self) -> Result<Vec<ActiveBanner>> {
        let entries = self.store.ranked_entries(&self.keys.active).await?;
        let days = self.store.map_entries(&self.keys.days).await?;
        Ok(entries
            .into_iter()
            .map(|(url, position)| {
                let day = days
                    .get(&url)
                    .and_then(|tag| DayRule::from_str(tag).ok())
                    .unwrap_or_default();
                ActiveBanner { url, day, position }
            })
            .collect())
    }

    /// Active banners eligible on `date`: day rule `ALL` or the date's
    /// weekday tag.
    pub async fn list_displayable(&self, date: NaiveDate) -> Result<Vec<ActiveBanner>> {
        let weekday = date.weekday();
        Ok(self
            .list_active()
            .await?
            .into_iter()
            .filter(|banner| banner.day.matches(weekday))
            .collect())
    }

    pub async fn list_disabled(&self) -> Result<Vec<String>> {
        self.store.set_members(&self.keys.disabled).await
    }

    /// Upload the payload and append it to the active set. The upload runs
    /// first: a failure past that point leaves an unreferenced asset, never
    /// a dangling metadata entry.
    pub async fn create(
        &self,
        data: Bytes,
        content_type: Mime,
        day: Option<DayRule>,
    ) -> Result<ActiveBanner> {
        if data.is_empty() {
            return Err(AppError::Validation("empty upload payload".into()));
        }
        let day = day.unwrap_or_default();
        let stored = self
            .media
            .upload(data, content_type, &self.placement.folder, &self.placement.tag)
            .await?;
        let position = self.next_position().await?;
        self.store
            .ranked_insert(&self.keys.active, position, &stored.url)
            .await?;
        self.store
            .map_put(&self.keys.days, &stored.url, day.as_tag())
            .await?;
        info!(url = %stored.url, position, day = %day, "banner created");
        Ok(ActiveBanner {
            url: stored.url,
            day,
            position,
        })
    }

    /// Move `url` from the active set to the disabled set. Ineligible for
    /// display immediately afterwards.
    pub async fn disable(&self, url: &str) -> Result<()> {
        let removed = self.store.ranked_remove(&self.keys.active, url).await?;
        // Clear the day entry unconditionally so no stale rule survives.
        self.store.map_remove(&self.keys.days, url).await?;
        if removed == 0 {
            if self.store.set_contains(&self.keys.disabled, url).await? {
                return Err(AppError::Conflict(format!("banner already disabled: {url}")));
            }
            return Err(AppError::NotFound("banner", url.to_string()));
        }
        self.store.set_insert(&self.keys.disabled, url).await?;
        info!(url, "banner disabled");
        Ok(())
    }

    /// Move `url` back from the disabled set to the tail of the active set.
    /// Returns the assigned position.
    pub async fn enable(&self, url: &str, day: Option<DayRule>) -> Result<u64> {
        let removed = self.store.set_remove(&self.keys.disabled, url).await?;
        if removed == 0 {
            if self
                .store
                .ranked_score(&self.keys.active, url)
                .await?
                .is_some()
            {
                return Err(AppError::Conflict(format!("banner already active: {url}")));
            }
            return Err(AppError::NotFound("banner", url.to_string()));
        }
        let day = day.unwrap_or_default();
        let position = self.next_position().await?;
        self.store
            .ranked_insert(&self.keys.active, position, url)
            .await?;
        self.store.map_put(&self.keys.days, url, day.as_tag()).await?;
        info!(url, position, day = %day, "banner enabled");
        Ok(position)
    }

    /// Change the day rule of an active banner; position and membership are
    /// untouched.
    pub async fn update_day(&self, url: &str, day: DayRule) -> Result<()> {
        if self
            .store
            .ranked_score(&self.keys.active, url)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("active banner", url.to_string()));
        }
        self.store.map_put(&self.keys.days, url, day.as_tag()).await?;
        info!(url, day = %day, "banner day rule updated");
        Ok(())
    }

    /// Merge reorder: the given urls take positions `0..n`; urls not listed
    /// keep their previous scores. Returns the number of members added or
    /// re-scored.
    pub async fn reorder(&self, urls: &[String]) -> Result<u64> {
        if urls.is_empty() {
            return Ok(0);
        }
        let entries: Vec<(u64, String)> = urls
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, url)| (index as u64, url))
            .collect();
        let updated = self
            .store
            .ranked_insert_many(&self.keys.active, &entries)
            .await?;
        info!(requested = urls.len(), updated, "banner order merged");
        Ok(updated)
    }

    /// Destructive alternative to [`Self::reorder`]: the active set becomes
    /// exactly `urls`, in that order. Day entries of dropped urls are
    /// cleared.
    pub async fn replace_order(&self, urls: &[String]) -> Result<u64> {
        let previous = self.store.ranked_entries(&self.keys.active).await?;
        self.store.delete_key(&self.keys.active).await?;
        let entries: Vec<(u64, String)> = urls
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, url)| (index as u64, url))
            .collect();
        let inserted = if entries.is_empty() {
            0
        } else {
            self.store
                .ranked_insert_many(&self.keys.active, &entries)
                .await?
        };
        for (url, _) in previous {
            if !urls.contains(&url) {
                self.store.map_remove(&self.keys.days, &url).await?;
            }
        }
        info!(kept = urls.len(), inserted, "banner order replaced");
        Ok(inserted)
    }

    /// Remove `url` from all three metadata structures and best-effort
    /// delete the backing asset.
    ///
    /// All three removals run regardless of where the url actually resides,
    /// so a repeat call reports `NotFound` instead of crashing. The metadata
    /// removal is never rolled back when the media side fails; the outcome
    /// lands in [`DestroyOutcome`] for the caller to audit.
    pub async fn destroy(&self, url: &str) -> Result<DestroyOutcome> {
        let mut removed = self.store.ranked_remove(&self.keys.active, url).await?;
        removed += self.store.map_remove(&self.keys.days, url).await?;
        removed += self.store.set_remove(&self.keys.disabled, url).await?;
        if removed == 0 {
            return Err(AppError::NotFound("banner", url.to_string()));
        }
        let media = delete_backing_asset(self.media.as_ref(), url, &self.placement.folder).await;
        info!(url, removed, media = ?media, "banner destroyed");
        Ok(DestroyOutcome { removed, media })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::testing::{MemoryMediaStore, MemoryMetadataStore};
    use domains::{MediaStatus, MockMetadataStore};

    fn placement() -> MediaPlacement {
        MediaPlacement {
            folder: "banners".into(),
            tag: "banners".into(),
        }
    }

    fn setup() -> (Arc<MemoryMetadataStore>, Arc<MemoryMediaStore>, BannerRegistry) {
        let store = Arc::new(MemoryMetadataStore::new());
        let media = Arc::new(MemoryMediaStore::new());
        let registry =
            BannerRegistry::new(store.clone(), media.clone(), "banners", placement());
        (store, media, registry)
    }

    async fn create_n(registry: &BannerRegistry, n: usize) -> Vec<ActiveBanner> {
        let mut out = Vec::new();
        for _ in 0..n {
            out.push(
                registry
                    .create(Bytes::from_static(b"img"), mime::IMAGE_JPEG, None)
                    .await
                    .unwrap(),
            );
        }
        out
    }

    #[tokio::test]
    async fn creates_append_in_order() {
        let (_, _, registry) = setup();
        let created = create_n(&registry, 3).await;
        assert_eq!(created[0].position, 0);
        assert_eq!(created[2].position, 2);

        let listed = registry.list_active().await.unwrap();
        let urls: Vec<&str> = listed.iter().map(|b| b.url.as_str()).collect();
        let expected: Vec<&str> = created.iter().map(|b| b.url.as_str()).collect();
        assert_eq!(urls, expected);
        assert!(listed.windows(2).all(|w| w[0].position < w[1].position));
    }

    #[tokio::test]
    async fn create_defaults_day_to_all_and_records_it() {
        let (store, _, registry) = setup();
        let banner = registry
            .create(Bytes::from_static(b"img"), mime::IMAGE_JPEG, None)
            .await
            .unwrap();
        assert_eq!(banner.day, DayRule::All);
        let days = store.map_entries("banners:days").await.unwrap();
        assert_eq!(days.get(&banner.url).map(String::as_str), Some("ALL"));
    }

    #[tokio::test]
    async fn create_rejects_empty_payload_before_any_write() {
        let (store, media, registry) = setup();
        let err = registry
            .create(Bytes::new(), mime::IMAGE_JPEG, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(media.upload_count(), 0);
        assert_eq!(store.ranked_len("banners:active").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upload_failure_leaves_no_metadata() {
        let (store, media, registry) = setup();
        media.set_fail_uploads(true);
        let err = registry
            .create(Bytes::from_static(b"img"), mime::IMAGE_JPEG, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(store.ranked_len("banners:active").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn metadata_store_failure_propagates() {
        let mut mock = MockMetadataStore::new();
        mock.expect_ranked_len()
            .returning(|_| Err(AppError::Upstream("metadata store down".into())));
        let media = Arc::new(MemoryMediaStore::new());
        let registry =
            BannerRegistry::new(Arc::new(mock), media, "banners", placement());
        let err = registry
            .create(Bytes::from_static(b"img"), mime::IMAGE_JPEG, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn disable_hides_banner_and_clears_day_entry() {
        let (store, _, registry) = setup();
        let created = create_n(&registry, 2).await;
        let victim = &created[0].url;

        registry.disable(victim).await.unwrap();

        let active = registry.list_active().await.unwrap();
        assert!(active.iter().all(|b| &b.url != victim));
        assert_eq!(registry.list_disabled().await.unwrap(), vec![victim.clone()]);
        let days = store.map_entries("banners:days").await.unwrap();
        assert!(!days.contains_key(victim));
    }

    #[tokio::test]
    async fn disable_distinguishes_already_disabled_from_unknown() {
        let (_, _, registry) = setup();
        let created = create_n(&registry, 1).await;
        registry.disable(&created[0].url).await.unwrap();

        let again = registry.disable(&created[0].url).await.unwrap_err();
        assert!(matches!(again, AppError::Conflict(_)));

        let unknown = registry.disable("https://nowhere.invalid/x").await.unwrap_err();
        assert!(matches!(unknown, AppError::NotFound(_, _)));
    }

    #[tokio::test]
    async fn enable_appends_at_the_tail() {
        let (_, _, registry) = setup();
        let created = create_n(&registry, 3).await;
        registry.disable(&created[0].url).await.unwrap();

        let position = registry.enable(&created[0].url, None).await.unwrap();
        // tail of a two-member set
        assert_eq!(position, 2);
        let active = registry.list_active().await.unwrap();
        assert!(active
            .iter()
            .take(active.len() - 1)
            .all(|b| b.position <= position));
        assert!(registry.list_disabled().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enable_distinguishes_already_active_from_unknown() {
        let (_, _, registry) = setup();
        let created = create_n(&registry, 1).await;

        let err = registry.enable(&created[0].url, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let unknown = registry
            .enable("https://nowhere.invalid/x", None)
            .await
            .unwrap_err();
        assert!(matches!(unknown, AppError::NotFound(_, _)));
    }

    #[tokio::test]
    async fn day_rules_gate_display_by_weekday() {
        let (_, _, registry) = setup();
        let created = create_n(&registry, 1).await;
        let url = &created[0].url;

        registry.update_day(url, DayRule::Mon).await.unwrap();
        // 2024-01-01 was a Monday, 2024-01-02 a Tuesday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(registry.list_displayable(monday).await.unwrap().len(), 1);
        assert!(registry.list_displayable(tuesday).await.unwrap().is_empty());

        registry.update_day(url, DayRule::Tue).await.unwrap();
        assert!(registry.list_displayable(monday).await.unwrap().is_empty());
        assert_eq!(registry.list_displayable(tuesday).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_day_requires_an_active_banner() {
        let (_, _, registry) = setup();
        let created = create_n(&registry, 1).await;
        registry.disable(&created[0].url).await.unwrap();

        let err = registry
            .update_day(&created[0].url, DayRule::Fri)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
    }

    #[tokio::test]
    async fn disable_then_enable_with_day_rule_round_trips() {
        let (_, _, registry) = setup();
        let created = create_n(&registry, 1).await;
        let url = &created[0].url;

        registry.disable(url).await.unwrap();
        assert!(registry.list_active().await.unwrap().is_empty());

        registry.enable(url, Some(DayRule::Fri)).await.unwrap();
        // 2024-01-05 was a Friday, 2024-01-06 a Saturday
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(registry.list_displayable(friday).await.unwrap().len(), 1);
        assert!(registry.list_displayable(saturday).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reorder_rewrites_listed_positions_and_keeps_the_rest() {
        let (store, _, registry) = setup();
        let created = create_n(&registry, 3).await;
        let (a, b, c) = (&created[0].url, &created[1].url, &created[2].url);

        // full-list reorder is exact
        let updated = registry
            .reorder(&[b.clone(), a.clone(), c.clone()])
            .await
            .unwrap();
        assert_eq!(updated, 2); // c already sat at position 2
        let urls: Vec<String> = registry
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|x| x.url)
            .collect();
        assert_eq!(urls, vec![b.clone(), a.clone(), c.clone()]);

        // subset reorder leaves omitted urls at their old scores
        registry.reorder(&[c.clone()]).await.unwrap();
        assert_eq!(store.ranked_score("banners:active", c).await.unwrap(), Some(0));
        assert_eq!(store.ranked_score("banners:active", a).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn replace_order_drops_omitted_urls_and_their_day_entries() {
        let (store, _, registry) = setup();
        let created = create_n(&registry, 3).await;
        let (a, b, c) = (&created[0].url, &created[1].url, &created[2].url);
        registry.update_day(b, DayRule::Sat).await.unwrap();

        let inserted = registry.replace_order(&[c.clone(), a.clone()]).await.unwrap();
        assert_eq!(inserted, 2);
        let urls: Vec<String> = registry
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|x| x.url)
            .collect();
        assert_eq!(urls, vec![c.clone(), a.clone()]);
        let days = store.map_entries("banners:days").await.unwrap();
        assert!(!days.contains_key(b));
    }

    #[tokio::test]
    async fn destroy_clears_metadata_and_media() {
        let (store, media, registry) = setup();
        let created = create_n(&registry, 1).await;
        let url = &created[0].url;

        let outcome = registry.destroy(url).await.unwrap();
        // active entry plus day entry
        assert_eq!(outcome.removed, 2);
        assert_eq!(outcome.media, MediaStatus::Deleted);
        assert!(media.asset_ids().is_empty());
        assert_eq!(store.ranked_len("banners:active").await.unwrap(), 0);

        // idempotent in its metadata effect: the second call is a clean miss
        let again = registry.destroy(url).await.unwrap_err();
        assert!(matches!(again, AppError::NotFound(_, _)));
    }

    #[tokio::test]
    async fn destroy_reaches_disabled_banners_too() {
        let (_, media, registry) = setup();
        let created = create_n(&registry, 1).await;
        registry.disable(&created[0].url).await.unwrap();

        let outcome = registry.destroy(&created[0].url).await.unwrap();
        // disabled entry only; disable already cleared the day entry
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.media, MediaStatus::Deleted);
        assert!(media.asset_ids().is_empty());
    }

    #[tokio::test]
    async fn destroy_skips_media_when_no_asset_id_derives() {
        let (store, _, registry) = setup();
        store
            .ranked_insert("banners:active", 0, "https://cdn.invalid/no-folder-here.jpg")
            .await
            .unwrap();

        let outcome = registry
            .destroy("https://cdn.invalid/no-folder-here.jpg")
            .await
            .unwrap();
        assert_eq!(outcome.media, MediaStatus::SkippedUnparsableUrl);
        assert_eq!(store.ranked_len("banners:active").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn destroy_keeps_metadata_removal_when_media_delete_fails() {
        let (store, media, registry) = setup();
        let created = create_n(&registry, 1).await;
        let url = &created[0].url;
        for id in media.asset_ids() {
            media.fail_delete_of(&id);
        }

        let outcome = registry.destroy(url).await.unwrap();
        assert!(matches!(outcome.media, MediaStatus::Failed(_)));
        assert_eq!(store.ranked_len("banners:active").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn destroy_reports_store_only_removal_for_a_gone_asset() {
        let (_, media, registry) = setup();
        let created = create_n(&registry, 1).await;
        // asset disappears out-of-band
        for id in media.asset_ids() {
            media.delete(&id).await.unwrap();
        }

        let outcome = registry.destroy(&created[0].url).await.unwrap();
        assert_eq!(outcome.media, MediaStatus::RemovedFromStoreOnly);
    }

    #[tokio::test]
    async fn unparsable_day_entries_fall_back_to_all() {
        let (store, _, registry) = setup();
        let created = create_n(&registry, 1).await;
        store
            .map_put("banners:days", &created[0].url, "NEVERDAY")
            .await
            .unwrap();

        let listed = registry.list_active().await.unwrap();
        assert_eq!(listed[0].day, DayRule::All);
    }
}
