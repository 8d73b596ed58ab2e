//! vitrine/crates/api-adapters/src/lib.rs
//!
//! The web routing and orchestration layer for vitrine.

#[cfg(feature = "web-axum")]
pub mod web;
