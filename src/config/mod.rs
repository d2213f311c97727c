//! Installer configuration loading.
//!
//! Reads the static artifact list and the build context from a TOML, JSON or
//! JSON5 file. Relative directories resolve against the file's own directory so a
//! configuration behaves the same from any working directory.
//!
//! ```toml
//! artifacts_dir = "artifacts"
//! build_dir = "c:/installer"
//!
//! [layout]
//! base_artifact = "gpii-wix-installer"
//! app_artifact = "gpii-app"
//!
//! [[artifacts]]
//! id = "gpii-app"
//! repo = "https://github.com/GPII/gpii-app"
//! hash = "92f9b5e1ba01fc2b39f92d235bfa4b64d60108c5"
//!
//! [[artifacts]]
//! id = "reset-to-standard"
//! url = "https://example.org/resetToStandard.json5"
//! output = "resetToStandard.json5"
//! outputPath = "gpii-app/testData/resetToStandard.json5"
//! ```

use crate::bundler::{
    Artifact, ArtifactSource, BuildContext, BuildContextBuilder, BuildDirective, LayoutSettings,
    ServiceSettings, StageName, ToolSettings,
};
use crate::error::{CliError, InstallerError, Result};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raw configuration file contents.
#[derive(Debug, Deserialize)]
pub struct InstallerConfig {
    /// Scratch directory for acquisition
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Build tree
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Cancel sibling acquisitions after the first failure
    #[serde(default)]
    pub cancel_on_failure: bool,

    /// Narrowed stage chain
    #[serde(default)]
    pub stages: Option<Vec<StageName>>,

    /// Seed artifacts of the build tree
    #[serde(default)]
    pub layout: LayoutSettings,

    /// External tool commands
    #[serde(default)]
    pub tools: ToolSettings,

    /// Background service build
    #[serde(default)]
    pub service: Option<ServiceSettings>,

    /// Artifacts, as a list or as a map keyed by id
    #[serde(default)]
    pub artifacts: ArtifactList,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

/// Artifact declarations.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ArtifactList {
    /// `[[artifacts]]` entries carrying their own id
    List(Vec<ArtifactConfig>),
    /// `{ "<id>": { ... } }`
    Map(BTreeMap<String, ArtifactConfig>),
}

impl Default for ArtifactList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// One artifact declaration.
#[derive(Debug, Deserialize)]
pub struct ArtifactConfig {
    /// Unique id (taken from the map key when omitted)
    #[serde(default)]
    pub id: Option<String>,

    /// Repository root, combined with `hash`
    #[serde(default)]
    pub repo: Option<String>,

    /// Commit hash of a repository snapshot
    #[serde(default)]
    pub hash: Option<String>,

    /// Direct download URL
    #[serde(default)]
    pub url: Option<String>,

    /// Build directive run in the extracted folder
    #[serde(default)]
    pub build: Option<BuildDirective>,

    /// File name inside the artifacts directory
    #[serde(default)]
    pub output: Option<String>,

    /// Copy target inside the build tree
    #[serde(default, alias = "outputPath")]
    pub output_path: Option<PathBuf>,

    /// Expand a downloaded URL archive
    #[serde(default)]
    pub extract: bool,

    /// Expected SHA-256 of the download
    #[serde(default)]
    pub sha256: Option<String>,
}

impl ArtifactConfig {
    /// Validates the declaration and turns it into an [`Artifact`].
    pub fn into_artifact(self, fallback_id: Option<&str>) -> std::result::Result<Artifact, String> {
        let id = self
            .id
            .or_else(|| fallback_id.map(str::to_string))
            .filter(|id| !id.trim().is_empty())
            .ok_or("artifact without an id")?;

        let source = match (self.repo, self.url) {
            (Some(root), None) => {
                let hash = self
                    .hash
                    .ok_or_else(|| format!("artifact `{id}`: `repo` requires `hash`"))?;
                ArtifactSource::Repository { root, hash }
            }
            (None, Some(url)) => {
                let file_name = match &self.output {
                    Some(output) => output.clone(),
                    None => file_name_from_url(&url)
                        .ok_or_else(|| format!("artifact `{id}`: cannot derive a file name from {url}"))?,
                };
                ArtifactSource::RemoteArchive {
                    url,
                    file_name,
                    extract: self.extract,
                }
            }
            (Some(_), Some(_)) => {
                return Err(format!("artifact `{id}`: `repo` and `url` are mutually exclusive"));
            }
            (None, None) => return Err(format!("artifact `{id}`: needs `repo` or `url`")),
        };

        let output = self.output.or_else(|| match &source {
            ArtifactSource::RemoteArchive { file_name, .. } => Some(file_name.clone()),
            ArtifactSource::Repository { .. } => None,
        });

        let mut artifact = Artifact::new(id.clone(), source);
        if let Some(build) = self.build {
            artifact = artifact.with_build(build);
        }
        if let Some(digest) = self.sha256 {
            artifact = artifact.with_sha256(digest);
        }
        if let Some(output_path) = self.output_path {
            let output =
                output.ok_or_else(|| format!("artifact `{id}`: `outputPath` requires `output`"))?;
            artifact = artifact.with_output(output, output_path);
        }
        Ok(artifact)
    }
}

fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(str::to_string)
}

/// Configuration file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml` (and any unknown extension)
    Toml,
    /// `.json`
    Json,
    /// `.json5`: comments, unquoted keys, trailing commas
    Json5,
}

impl ConfigFormat {
    /// Picks the syntax from the file extension.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            Some(ext) if ext.eq_ignore_ascii_case("json5") => Self::Json5,
            _ => Self::Toml,
        }
    }
}

/// Parses configuration text in the given syntax.
pub fn parse_config(
    text: &str,
    format: ConfigFormat,
) -> std::result::Result<InstallerConfig, InstallerError> {
    Ok(match format {
        ConfigFormat::Toml => toml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
        ConfigFormat::Json5 => json5::from_str(text)?,
    })
}

/// Loads a configuration file into a [`BuildContext`].
pub fn load_config(config_path: &Path) -> Result<BuildContext> {
    let config_path = config_path
        .absolutize()
        .map_err(|e| invalid(config_path, e))?
        .into_owned();

    let text = std::fs::read_to_string(&config_path).map_err(|e| invalid(&config_path, e))?;

    let config = parse_config(&text, ConfigFormat::detect(&config_path))?;

    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    into_context(config, &base_dir).map_err(|e| match e {
        InstallerError::Cli(CliError::InvalidConfig { reason, .. }) => invalid(&config_path, reason),
        other => other,
    })
}

/// Turns parsed configuration into a [`BuildContext`], resolving relative
/// directories against `base_dir`.
pub fn into_context(config: InstallerConfig, base_dir: &Path) -> Result<BuildContext> {
    let artifacts = match config.artifacts {
        ArtifactList::List(list) => list
            .into_iter()
            .map(|a| a.into_artifact(None))
            .collect::<std::result::Result<Vec<_>, _>>(),
        ArtifactList::Map(map) => map
            .into_iter()
            .map(|(key, a)| a.into_artifact(Some(&key)))
            .collect::<std::result::Result<Vec<_>, _>>(),
    }
    .map_err(|reason| invalid(base_dir, reason))?;

    let artifacts_dir = resolve_dir(&config.artifacts_dir, base_dir)?;
    let build_dir = resolve_dir(&config.build_dir, base_dir)?;

    let mut builder = BuildContextBuilder::new()
        .artifacts_dir(artifacts_dir)
        .build_dir(build_dir)
        .artifacts(artifacts)
        .layout(config.layout)
        .tools(config.tools)
        .cancel_on_failure(config.cancel_on_failure);

    if let Some(stages) = config.stages {
        builder = builder.stages(stages);
    }
    if let Some(service) = config.service {
        builder = builder.service(service);
    }

    Ok(builder.build()?)
}

fn resolve_dir(dir: &Path, base_dir: &Path) -> Result<PathBuf> {
    Ok(dir
        .absolutize_from(base_dir)
        .map_err(|e| invalid(dir, e))?
        .into_owned())
}

fn invalid(path: &Path, reason: impl std::fmt::Display) -> InstallerError {
    InstallerError::Cli(CliError::InvalidConfig {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    })
}
