//! # Sweep Binary
//!
//! One-shot cleanup runner for cron schedules that prefer a process over an
//! HTTP call. Runs the configured banner cleanup policy; pass `--flyers` to
//! sweep the flyer shelf as well.

use std::sync::Arc;

use anyhow::Context;
use configs::AppConfig;
use services::{CleanupService, FlyerShelf, MediaPlacement};
use storage_adapters::{HttpMediaStore, RedisMetadataStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let store = Arc::new(
        RedisMetadataStore::from_url(&config.redis.url).context("initializing redis")?,
    );
    let media = Arc::new(HttpMediaStore::new(config.media.base_url.clone()));

    let cleanup = CleanupService::new(
        store.clone(),
        media.clone(),
        &config.banners.namespace,
        MediaPlacement {
            folder: config.banners.folder.clone(),
            tag: config.banners.tag.clone(),
        },
        config.cleanup.policy,
    );
    let report = cleanup.run().await.context("banner cleanup")?;
    tracing::info!(?report, "banner cleanup finished");

    if std::env::args().any(|arg| arg == "--flyers") {
        let shelf = FlyerShelf::new(
            store,
            media,
            &config.flyers.namespace,
            MediaPlacement {
                folder: config.flyers.folder.clone(),
                tag: config.flyers.tag.clone(),
            },
            config.flyers.expiry,
        );
        let report = shelf.sweep().await.context("flyer sweep")?;
        tracing::info!(?report, "flyer sweep finished");
    }

    Ok(())
}
