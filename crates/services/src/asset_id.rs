//! Derives a media-store asset id from a previously issued url.
//!
//! Delivery urls carry a version segment ahead of the folder, e.g.
//! `https://host/raw/upload/v1712345678/banners/abc123.jpg`. The asset id is
//! the path from the configured folder onward with the file extension
//! stripped (`banners/abc123`).

use url::Url;

/// Pure extraction, no I/O. Returns `None` on a malformed url, a missing
/// folder segment, or a folder with nothing after it; callers treat `None`
/// as "media-side deletion skipped", never as a fatal error.
pub fn extract_asset_id(raw_url: &str, folder: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let start = segments.iter().position(|s| *s == folder)?;
    if start + 1 >= segments.len() {
        return None;
    }
    let mut parts: Vec<&str> = segments[start..].to_vec();
    let file = parts.pop()?;
    let base = file.rsplit_once('.').map(|(b, _)| b).unwrap_or(file);
    if base.is_empty() {
        return None;
    }
    parts.push(base);
    Some(parts.join("/"))
}
