//! HTTP utilities for downloading artifacts.
//!
//! Streams a response body straight to disk. `file://` URLs are copied from
//! the local filesystem so mirrored snapshots work without a server.

use crate::bundler::error::{Error, Result};
use futures_lite::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Downloads `url` into `dest`, returning the number of bytes written.
///
/// The destination file is fully flushed and closed before this returns. On
/// any failure the partial file is removed.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    cancel: Option<&CancellationToken>,
) -> Result<u64> {
    let parsed = Url::parse(url).map_err(|e| transfer_error(url, e))?;

    let result = match parsed.scheme() {
        "file" => copy_local(&parsed, url, dest).await,
        "http" | "https" => stream_remote(client, url, dest, cancel).await,
        other => Err(transfer_error(url, format!("unsupported URL scheme `{other}`"))),
    };

    if result.is_err() {
        // A partial file must never be mistaken for a download.
        let _ = tokio::fs::remove_file(dest).await;
    }
    result
}

async fn copy_local(parsed: &Url, url: &str, dest: &Path) -> Result<u64> {
    let source = parsed
        .to_file_path()
        .map_err(|()| transfer_error(url, "not a valid local path"))?;
    tokio::fs::copy(&source, dest)
        .await
        .map_err(|e| transfer_error(url, e))
}

async fn stream_remote(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    cancel: Option<&CancellationToken>,
) -> Result<u64> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| transfer_error(url, e))?;

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| transfer_error(url, e))?;
    let mut stream = std::pin::pin!(response.bytes_stream());
    let mut written = 0u64;

    loop {
        let chunk = match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(Error::Cancelled),
                chunk = stream.next() => chunk,
            },
            None => stream.next().await,
        };
        let Some(chunk) = chunk else { break };
        let bytes = chunk.map_err(|e| transfer_error(url, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| transfer_error(url, e))?;
        written += bytes.len() as u64;
    }

    file.flush().await.map_err(|e| transfer_error(url, e))?;
    file.sync_all().await.map_err(|e| transfer_error(url, e))?;
    drop(file);

    Ok(written)
}

fn transfer_error(url: &str, reason: impl std::fmt::Display) -> Error {
    Error::Transfer {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
