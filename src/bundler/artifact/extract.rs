//! Archive expansion and folder normalization.
//!
//! Snapshots unpack to `<name>-<hash>/`; the pipeline wants `<name>/`. The
//! archive libraries are driven on a blocking worker, and that worker is the
//! failure boundary: read errors, corrupt archives and library panics all come
//! back as [`Error::Extract`] naming the archive instead of taking the whole
//! run down.

use crate::bundler::{
    error::{Error, Result},
    utils::fs,
};
use std::{
    any::Any,
    path::{Component, Path, PathBuf},
};

/// Supported archive formats, detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.tar.gz` / `.tgz`
    TarGz,
}

impl ArchiveFormat {
    /// Detects the format from the archive's file name.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Strips the hash suffix from an extracted folder name.
///
/// `gpii-app-92f9b5e1` becomes `gpii-app`. Names without a `-` are kept.
pub fn normalized_folder_name(top_level: &str) -> &str {
    match top_level.rfind('-') {
        Some(idx) if idx > 0 => &top_level[..idx],
        _ => top_level,
    }
}

/// Expands `archive` into `dest_dir` and returns the normalized folder.
///
/// 1. The top-level directory is read from the first archive entry
/// 2. A stale directory with that name is removed, then every entry is expanded
/// 3. A directory with the normalized name is removed, the top-level
///    directory is renamed to it, and the archive is deleted
///
/// No rollback happens on failure; the error names the archive.
pub async fn extract(archive: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let archive_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string());

    log::info!("Unzipping {}", archive.display());

    let format = ArchiveFormat::detect(archive)
        .ok_or_else(|| extract_error(&archive_name, "unsupported archive format"))?;

    let top_level = {
        let archive = archive.to_path_buf();
        let dest_dir = dest_dir.to_path_buf();
        tokio::task::spawn_blocking(move || expand(format, &archive, &dest_dir))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    extract_error(&archive_name, panic_message(e.into_panic()))
                } else {
                    extract_error(&archive_name, e)
                }
            })?
            .map_err(|reason| extract_error(&archive_name, reason))?
    };

    let extracted = dest_dir.join(&top_level);
    let normalized = dest_dir.join(normalized_folder_name(&top_level));

    if extracted != normalized {
        fs::replace_dir(&extracted, &normalized)
            .await
            .map_err(|e| extract_error(&archive_name, e))?;
    }
    fs::remove_file(archive)
        .await
        .map_err(|e| extract_error(&archive_name, e))?;

    log::debug!("Extracted {} to {}", archive_name, normalized.display());
    Ok(normalized)
}

/// Runs on the blocking pool. Returns the top-level directory name.
fn expand(format: ArchiveFormat, archive: &Path, dest_dir: &Path) -> std::result::Result<String, String> {
    std::fs::create_dir_all(dest_dir).map_err(|e| e.to_string())?;

    let top_level = match format {
        ArchiveFormat::Zip => zip_top_level(archive)?,
        ArchiveFormat::TarGz => tar_top_level(archive)?,
    };

    let stale = dest_dir.join(&top_level);
    if stale.exists() {
        std::fs::remove_dir_all(&stale).map_err(|e| e.to_string())?;
    }

    match format {
        ArchiveFormat::Zip => {
            let file = std::fs::File::open(archive).map_err(|e| e.to_string())?;
            let mut zip = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
            zip.extract(dest_dir).map_err(|e| e.to_string())?;
        }
        ArchiveFormat::TarGz => {
            let file = std::fs::File::open(archive).map_err(|e| e.to_string())?;
            let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
            tar.unpack(dest_dir).map_err(|e| e.to_string())?;
        }
    }

    if !dest_dir.join(&top_level).is_dir() {
        return Err(format!("expected top-level directory `{top_level}` after expansion"));
    }
    Ok(top_level)
}

fn zip_top_level(archive: &Path) -> std::result::Result<String, String> {
    let file = std::fs::File::open(archive).map_err(|e| e.to_string())?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
    if zip.len() == 0 {
        return Err("archive has no entries".to_string());
    }
    let first = zip.by_index(0).map_err(|e| e.to_string())?;
    let name = first.name().to_string();
    top_level_dir(Path::new(&name), name.ends_with('/'))
}

fn tar_top_level(archive: &Path) -> std::result::Result<String, String> {
    let file = std::fs::File::open(archive).map_err(|e| e.to_string())?;
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
    for entry in tar.entries().map_err(|e| e.to_string())? {
        let entry = entry.map_err(|e| e.to_string())?;
        let kind = entry.header().entry_type();
        // GitHub tarballs open with a pax global header.
        if kind.is_pax_global_extensions() || kind.is_pax_local_extensions() {
            continue;
        }
        let path = entry.path().map_err(|e| e.to_string())?.into_owned();
        return top_level_dir(&path, kind.is_dir());
    }
    Err("archive has no entries".to_string())
}

fn top_level_dir(entry: &Path, is_dir: bool) -> std::result::Result<String, String> {
    let components: Vec<_> = entry
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    match components.first() {
        Some(first) if is_dir || components.len() > 1 => Ok(first.clone()),
        _ => Err(format!(
            "first entry `{}` is not inside a top-level directory",
            entry.display()
        )),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("archive library panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("archive library panicked: {msg}")
    } else {
        "archive library panicked".to_string()
    }
}

fn extract_error(archive: &str, reason: impl std::fmt::Display) -> Error {
    Error::Extract {
        archive: archive.to_string(),
        reason: reason.to_string(),
    }
}
