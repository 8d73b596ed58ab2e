//! vitrine/crates/storage-adapters/src/lib.rs
//!
//! Feature-gated adapter implementations of the `domains` store ports.

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "media-http")]
pub mod media_http;

#[cfg(feature = "media-local")]
pub mod media_local;

#[cfg(feature = "redis")]
pub use redis::RedisMetadataStore;

#[cfg(feature = "media-http")]
pub use media_http::HttpMediaStore;

#[cfg(feature = "media-local")]
pub use media_local::LocalMediaStore;
