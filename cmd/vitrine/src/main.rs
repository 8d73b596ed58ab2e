//! # Vitrine Binary
//!
//! The entry point that assembles the application from configuration and the
//! compiled-in adapters.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::web::{self, AppState};
use configs::AppConfig;
use services::{BannerRegistry, CleanupService, FlyerShelf, MediaPlacement};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "redis")]
use storage_adapters::RedisMetadataStore;

#[cfg(feature = "media-http")]
use storage_adapters::HttpMediaStore;

#[cfg(all(feature = "media-local", not(feature = "media-http")))]
use storage_adapters::LocalMediaStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging first, so config problems are visible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Configuration (.env + optional file + environment)
    let config = AppConfig::load().context("loading configuration")?;

    // 3. Metadata store
    #[cfg(feature = "redis")]
    let store = Arc::new(
        RedisMetadataStore::from_url(&config.redis.url).context("initializing redis")?,
    );

    // 4. Media store
    #[cfg(feature = "media-http")]
    let media = Arc::new(HttpMediaStore::new(config.media.base_url.clone()));

    #[cfg(all(feature = "media-local", not(feature = "media-http")))]
    let media = Arc::new(LocalMediaStore::new(
        config.media.local_root.clone().into(),
        config.media.local_prefix.clone(),
    ));

    // 5. Domain services
    let banners = Arc::new(BannerRegistry::new(
        store.clone(),
        media.clone(),
        &config.banners.namespace,
        MediaPlacement {
            folder: config.banners.folder.clone(),
            tag: config.banners.tag.clone(),
        },
    ));
    let flyers = Arc::new(FlyerShelf::new(
        store.clone(),
        media.clone(),
        &config.flyers.namespace,
        MediaPlacement {
            folder: config.flyers.folder.clone(),
            tag: config.flyers.tag.clone(),
        },
        config.flyers.expiry,
    ));
    let cleanup = Arc::new(CleanupService::new(
        store.clone(),
        media.clone(),
        &config.banners.namespace,
        MediaPlacement {
            folder: config.banners.folder.clone(),
            tag: config.banners.tag.clone(),
        },
        config.cleanup.policy,
    ));

    // 6. HTTP surface
    let state = Arc::new(AppState {
        banners,
        flyers,
        cleanup,
        cleanup_token: config.cleanup.token,
    });
    let app = web::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "vitrine listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
