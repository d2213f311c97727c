//! Artifact acquisition: resolve the source, download it, verify it.

use super::checksum::verify_sha256;
use crate::bundler::{
    error::{ErrorExt, Result},
    settings::Artifact,
    utils::{fs, http},
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Downloads the artifact's source into `dest_dir`.
///
/// Creates `dest_dir` if needed and removes any file of the same target
/// name first; transfers are never appended to or resumed. Returns the local
/// path once the file is closed (and its digest verified, when configured).
pub async fn acquire(
    client: &reqwest::Client,
    artifact: &Artifact,
    dest_dir: &Path,
    cancel: Option<&CancellationToken>,
) -> Result<PathBuf> {
    let source = artifact.source();
    let url = source.download_url();
    let dest = dest_dir.join(source.file_name());

    tokio::fs::create_dir_all(dest_dir)
        .await
        .fs_context("creating artifacts directory", dest_dir)?;
    fs::remove_file(&dest).await?;

    log::info!("Downloading {}", url);
    let bytes = http::download_to_file(client, &url, &dest, cancel).await?;
    log::debug!("Downloaded {} bytes to {}", bytes, dest.display());

    if let Some(expected) = artifact.sha256() {
        if let Err(e) = verify_sha256(&dest, expected).await {
            let _ = fs::remove_file(&dest).await;
            return Err(e);
        }
    }

    Ok(dest)
}
