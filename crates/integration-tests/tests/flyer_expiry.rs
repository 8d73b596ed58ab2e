//! Flyer shelf expiry behavior: the whole collection vanishing at the
//! display-region midnight, and persistence under the sweep-only policy.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use domains::testing::{MemoryMediaStore, MemoryMetadataStore};
use services::clock::next_midnight_after;
use services::{FlyerExpiry, FlyerShelf, MediaPlacement};

fn shelf(
    expiry: FlyerExpiry,
) -> (Arc<MemoryMetadataStore>, Arc<MemoryMediaStore>, FlyerShelf) {
    let store = Arc::new(MemoryMetadataStore::new());
    let media = Arc::new(MemoryMediaStore::new());
    let shelf = FlyerShelf::new(
        store.clone(),
        media.clone(),
        "encartes",
        MediaPlacement {
            folder: "encartes".into(),
            tag: "encartes".into(),
        },
        expiry,
    );
    (store, media, shelf)
}

fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap()
}

#[tokio::test]
async fn the_collection_expires_at_midnight_without_deletes() {
    let (store, _, shelf) = shelf(FlyerExpiry::MidnightTtl);
    store.set_now(morning().timestamp());
    shelf
        .add(Bytes::from_static(b"page1"), mime::IMAGE_PNG, morning())
        .await
        .unwrap();
    shelf
        .add(Bytes::from_static(b"page2"), mime::IMAGE_PNG, morning())
        .await
        .unwrap();
    assert_eq!(shelf.list().await.unwrap().len(), 2);

    // one second before midnight: still there
    let midnight = next_midnight_after(morning());
    store.set_now(midnight - 1);
    assert_eq!(shelf.list().await.unwrap().len(), 2);

    // past midnight: the whole key is gone at once
    store.set_now(midnight + 1);
    assert!(shelf.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn sweep_only_flyers_survive_midnight() {
    let (store, _, shelf) = shelf(FlyerExpiry::SweepOnly);
    store.set_now(morning().timestamp());
    shelf
        .add(Bytes::from_static(b"page1"), mime::IMAGE_PNG, morning())
        .await
        .unwrap();

    store.set_now(next_midnight_after(morning()) + 3600);
    assert_eq!(shelf.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn single_flyer_deletion_works_under_the_ttl_policy() {
    let (_, media, shelf) = shelf(FlyerExpiry::MidnightTtl);
    let url = shelf
        .add(Bytes::from_static(b"page1"), mime::IMAGE_PNG, morning())
        .await
        .unwrap();
    let keep = shelf
        .add(Bytes::from_static(b"page2"), mime::IMAGE_PNG, morning())
        .await
        .unwrap();

    shelf.destroy(&url).await.unwrap();
    assert_eq!(shelf.list().await.unwrap(), vec![keep]);
    assert_eq!(media.asset_ids().len(), 1);
}
