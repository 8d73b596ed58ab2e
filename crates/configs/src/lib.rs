//! vitrine/crates/configs/src/lib.rs
//!
//! Layered configuration: compiled defaults, then an optional TOML file
//! (path taken from `VITRINE_CONFIG`), then `VITRINE`-prefixed environment
//! variables with `__` as the section separator, e.g.
//! `VITRINE__SERVER__PORT=9090` or `VITRINE__CLEANUP__TOKEN=...`.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use services::{CleanupPolicy, FlyerExpiry};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Base url of the remote media API (adapter feature `media-http`).
    pub base_url: String,
    /// Root directory and public prefix for the local adapter
    /// (adapter feature `media-local`).
    pub local_root: String,
    pub local_prefix: String,
}

/// Namespace and media placement of the banner carousel.
#[derive(Debug, Clone, Deserialize)]
pub struct BannersConfig {
    pub namespace: String,
    pub folder: String,
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlyersConfig {
    pub namespace: String,
    pub folder: String,
    pub tag: String,
    pub expiry: FlyerExpiry,
}

#[derive(Debug, Deserialize)]
pub struct CleanupConfig {
    pub policy: CleanupPolicy,
    /// When set, the cleanup routes demand this bearer token.
    pub token: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub media: MediaConfig,
    pub banners: BannersConfig,
    pub flyers: FlyersConfig,
    pub cleanup: CleanupConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // .env is a convenience for local runs; absence is fine
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("media.base_url", "http://127.0.0.1:9000")?
            .set_default("media.local_root", "./data/media")?
            .set_default("media.local_prefix", "http://127.0.0.1:8080/static")?
            .set_default("banners.namespace", "banners")?
            .set_default("banners.folder", "banners")?
            .set_default("banners.tag", "banners")?
            .set_default("flyers.namespace", "encartes")?
            .set_default("flyers.folder", "encartes")?
            .set_default("flyers.tag", "encartes")?
            .set_default("flyers.expiry", "midnight-ttl")?
            .set_default("cleanup.policy", "disabled-sweep")?;

        if let Ok(path) = std::env::var("VITRINE_CONFIG") {
            debug!(%path, "loading configuration file");
            builder = builder.add_source(File::with_name(&path));
        }

        let cfg = builder
            .add_source(Environment::with_prefix("VITRINE").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}
