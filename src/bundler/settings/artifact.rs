//! Artifact descriptors.

use std::path::{Path, PathBuf};

/// Where an artifact comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactSource {
    /// A file published at a fixed URL.
    RemoteArchive {
        /// Download URL
        url: String,
        /// Local file name inside the artifacts directory
        file_name: String,
        /// Whether the downloaded file is an archive to expand
        extract: bool,
    },

    /// A snapshot of a repository at a given commit.
    ///
    /// Resolves to `<root>/archive/<hash>.zip`.
    Repository {
        /// Repository root URL (e.g. `https://github.com/org/repo`)
        root: String,
        /// Commit hash
        hash: String,
    },
}

impl ArtifactSource {
    /// Returns the concrete URL to fetch.
    pub fn download_url(&self) -> String {
        match self {
            Self::RemoteArchive { url, .. } => url.clone(),
            Self::Repository { root, hash } => {
                format!("{}/archive/{}.zip", root.trim_end_matches('/'), hash)
            }
        }
    }

    /// Returns the name the downloaded file gets in the artifacts directory.
    pub fn file_name(&self) -> String {
        match self {
            Self::RemoteArchive { file_name, .. } => file_name.clone(),
            Self::Repository { hash, .. } => format!("{hash}.zip"),
        }
    }

    /// Whether the fetched file is expanded before the artifact is ready.
    pub fn needs_extraction(&self) -> bool {
        match self {
            Self::RemoteArchive { extract, .. } => *extract,
            Self::Repository { .. } => true,
        }
    }
}

/// Command run inside an artifact's output directory once it is extracted.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct BuildDirective {
    /// Program name
    pub command: String,

    /// Arguments passed to the program
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// An external component acquired before packaging.
#[derive(Clone, Debug)]
pub struct Artifact {
    id: String,
    source: ArtifactSource,
    build: Option<BuildDirective>,
    output: Option<String>,
    output_path: Option<PathBuf>,
    sha256: Option<String>,
    output_dir: Option<PathBuf>,
}

impl Artifact {
    /// Creates an artifact with no build directive and no auxiliary output.
    pub fn new(id: impl Into<String>, source: ArtifactSource) -> Self {
        Self {
            id: id.into(),
            source,
            build: None,
            output: None,
            output_path: None,
            sha256: None,
            output_dir: None,
        }
    }

    /// Sets the build directive.
    pub fn with_build(mut self, build: BuildDirective) -> Self {
        self.build = Some(build);
        self
    }

    /// Declares a produced file to copy into the build tree.
    ///
    /// `output` is relative to the artifacts directory, `output_path` to the
    /// build directory.
    pub fn with_output(mut self, output: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self.output_path = Some(output_path.into());
        self
    }

    /// Sets the expected SHA-256 of the downloaded file.
    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into().to_ascii_lowercase());
        self
    }

    /// Returns the artifact id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the source descriptor.
    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    /// Returns the build directive, if any.
    pub fn build(&self) -> Option<&BuildDirective> {
        self.build.as_ref()
    }

    /// Returns the produced file name, if any.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Returns the copy target inside the build tree, if any.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Returns the expected SHA-256, if any.
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    /// Returns the output directory once the artifact is ready.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Records the output directory.
    ///
    /// Returns `false` and keeps the first value if it was already set.
    pub(crate) fn set_output_dir(&mut self, dir: PathBuf) -> bool {
        if self.output_dir.is_some() {
            return false;
        }
        self.output_dir = Some(dir);
        true
    }
}
