//! Media-side removal shared by the destructive operations.

use domains::{MediaDeleteStatus, MediaStatus, MediaStore};
use tracing::warn;

use crate::asset_id::extract_asset_id;

/// Best-effort delete of the asset behind `url`. Infallible: the caller's
/// metadata mutation has already committed and is never rolled back, so
/// every failure mode collapses into a reportable [`MediaStatus`].
pub(crate) async fn delete_backing_asset(
    media: &dyn MediaStore,
    url: &str,
    folder: &str,
) -> MediaStatus {
    let Some(asset_id) = extract_asset_id(url, folder) else {
        warn!(url, "no asset id derivable; media deletion skipped");
        return MediaStatus::SkippedUnparsableUrl;
    };
    match media.delete(&asset_id).await {
        Ok(MediaDeleteStatus::Deleted) => MediaStatus::Deleted,
        Ok(MediaDeleteStatus::NotFound) => MediaStatus::RemovedFromStoreOnly,
        Ok(MediaDeleteStatus::Other(detail)) => {
            warn!(url, %detail, "media store refused delete; metadata removal stands");
            MediaStatus::Failed(detail)
        }
        Err(err) => {
            warn!(url, error = %err, "media delete failed; metadata removal stands");
            MediaStatus::Failed(err.to_string())
        }
    }
}
