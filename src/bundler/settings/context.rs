//! Build context shared by every pipeline component.

use super::{Artifact, LayoutSettings, ServiceSettings, ToolSettings};
use crate::bundler::builder::StageName;
use std::path::{Path, PathBuf};

/// Process-wide configuration for one installer run.
///
/// Constructed via [`BuildContextBuilder`](super::BuildContextBuilder) or
/// loaded from a configuration file, then passed by reference to the
/// coordinator and to every stage.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_installer::bundler::{Artifact, ArtifactSource, BuildContextBuilder};
///
/// # fn example() -> kodegen_bundler_installer::bundler::Result<()> {
/// let context = BuildContextBuilder::new()
///     .artifacts_dir("artifacts")
///     .build_dir("c:/installer")
///     .artifact(Artifact::new(
///         "app",
///         ArtifactSource::Repository {
///             root: "https://github.com/org/app".into(),
///             hash: "92f9b5e1".into(),
///         },
///     ))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BuildContext {
    /// Scratch space for acquisition, wiped when population starts.
    artifacts_dir: PathBuf,

    /// Build tree, wiped when the build folder is prepared.
    build_dir: PathBuf,

    /// Artifacts to acquire.
    artifacts: Vec<Artifact>,

    /// Stages to run, in canonical order.
    stages: Vec<StageName>,

    /// Seed artifacts of the build directory.
    layout: LayoutSettings,

    /// External tool commands.
    tools: ToolSettings,

    /// Optional background service build.
    service: Option<ServiceSettings>,

    /// Cancel sibling acquisitions after the first failure.
    cancel_on_failure: bool,
}

impl BuildContext {
    /// Returns the artifacts (scratch) directory.
    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Returns the build directory.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Returns the configured artifacts.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Returns the stages to run.
    pub fn stages(&self) -> &[StageName] {
        &self.stages
    }

    /// Returns the layout settings.
    pub fn layout(&self) -> &LayoutSettings {
        &self.layout
    }

    /// Returns the tool settings.
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Returns the service settings, if a service is built.
    pub fn service(&self) -> Option<&ServiceSettings> {
        self.service.as_ref()
    }

    /// Whether sibling acquisitions are cancelled after the first failure.
    pub fn cancel_on_failure(&self) -> bool {
        self.cancel_on_failure
    }

    /// Directory of the application inside the build tree.
    pub fn app_dir(&self) -> PathBuf {
        self.build_dir.join(&self.layout.app_artifact)
    }

    /// Parent directory of the packager output.
    pub fn staging_root(&self) -> PathBuf {
        self.build_dir.join(&self.tools.packager.staging_dir)
    }

    /// Normalized packager output directory (e.g. `staging/windows`).
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_root().join(&self.tools.packager.staging_name)
    }

    /// Application directory inside the packaged output.
    pub fn packaged_app_dir(&self) -> PathBuf {
        self.staging_dir().join(&self.tools.packaged_app_dir)
    }

    /// Service sources directory, if a service is built.
    pub fn service_dir(&self) -> Option<PathBuf> {
        self.service.as_ref().map(|s| self.build_dir.join(&s.folder))
    }

    /// Substitutes `{build_dir}`, `{staging_dir}` and `{service_dir}`.
    pub fn expand(&self, template: &str) -> String {
        let mut expanded = template
            .replace("{build_dir}", &self.build_dir.to_string_lossy())
            .replace("{staging_dir}", &self.staging_dir().to_string_lossy());
        if let Some(service_dir) = self.service_dir() {
            expanded = expanded.replace("{service_dir}", &service_dir.to_string_lossy());
        }
        expanded
    }

    /// Expands a template and resolves it against the build directory.
    pub fn resolve(&self, template: &str) -> PathBuf {
        // Path::join keeps absolute right-hand sides as they are.
        self.build_dir.join(self.expand(template))
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        artifacts_dir: PathBuf,
        build_dir: PathBuf,
        artifacts: Vec<Artifact>,
        stages: Vec<StageName>,
        layout: LayoutSettings,
        tools: ToolSettings,
        service: Option<ServiceSettings>,
        cancel_on_failure: bool,
    ) -> Self {
        Self {
            artifacts_dir,
            build_dir,
            artifacts,
            stages,
            layout,
            tools,
            service,
            cancel_on_failure,
        }
    }

    pub(crate) fn set_artifacts_dir(&mut self, dir: PathBuf) {
        self.artifacts_dir = dir;
    }

    pub(crate) fn set_build_dir(&mut self, dir: PathBuf) {
        self.build_dir = dir;
    }

    pub(crate) fn set_cancel_on_failure(&mut self, cancel: bool) {
        self.cancel_on_failure = cancel;
    }
}
