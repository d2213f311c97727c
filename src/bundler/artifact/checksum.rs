//! Download digest verification.

use crate::bundler::{
    Result,
    error::{Error, ErrorExt},
};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates the SHA-256 of a file.
///
/// Reads in 8KB chunks and returns the hex-encoded digest (64 characters).
pub async fn calculate_file_sha256(file_path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Fails with [`Error::ChecksumMismatch`] unless the file hashes to `expected`.
pub async fn verify_sha256(file_path: &Path, expected: &str) -> Result<()> {
    let actual = calculate_file_sha256(file_path).await?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(Error::ChecksumMismatch {
            file: file_path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    log::debug!("Verified SHA-256 of {}", file_path.display());
    Ok(())
}
