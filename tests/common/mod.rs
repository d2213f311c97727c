//! Shared fixtures: snapshot archives served from the local filesystem.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use kodegen_bundler_installer::bundler::{Artifact, ArtifactSource};
use zip::write::SimpleFileOptions;

/// Writes `<root>/archive/<hash>.zip` whose single top-level folder is
/// `<name>-<hash>/`, and returns the repository root URL.
pub fn snapshot_repo(root: &Path, name: &str, hash: &str, files: &[(&str, &str)]) -> String {
    let archive_dir = root.join("archive");
    fs::create_dir_all(&archive_dir).unwrap();
    write_zip(&archive_dir.join(format!("{hash}.zip")), &format!("{name}-{hash}"), files);
    file_url(root)
}

/// Writes a zip with `top/` as the first entry followed by `files`.
pub fn write_zip(path: &Path, top: &str, files: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.add_directory(format!("{top}/"), options).unwrap();
    for (name, contents) in files {
        zip.start_file(format!("{top}/{name}"), options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// `file://` URL of a local path.
pub fn file_url(path: &Path) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}

/// Repository artifact served from a local snapshot.
pub fn repo_artifact(id: &str, mirror: &Path, hash: &str, files: &[(&str, &str)]) -> Artifact {
    let root = snapshot_repo(&mirror.join(id), id, hash, files);
    Artifact::new(
        id,
        ArtifactSource::Repository {
            root,
            hash: hash.to_string(),
        },
    )
}

/// Plain file artifact served from the local filesystem.
pub fn file_artifact(id: &str, source: &Path) -> Artifact {
    let file_name = source.file_name().unwrap().to_string_lossy().into_owned();
    Artifact::new(
        id,
        ArtifactSource::RemoteArchive {
            url: file_url(source),
            file_name,
            extract: false,
        },
    )
}

/// Sorted list of paths under `root`, relative to it.
pub fn tree(root: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap().path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    entries.sort();
    entries
}
