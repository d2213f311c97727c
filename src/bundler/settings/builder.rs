//! Builder for constructing a BuildContext.

use super::{Artifact, BuildContext, LayoutSettings, ServiceSettings, ToolSettings};
use crate::bundler::{Error, Result, builder::StageName};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Builder for constructing [`BuildContext`].
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_installer::bundler::{BuildContextBuilder, StageName};
///
/// # fn example() -> kodegen_bundler_installer::bundler::Result<()> {
/// let context = BuildContextBuilder::new()
///     .artifacts_dir("artifacts")
///     .build_dir("build")
///     .stages(vec![StageName::PrepareBuildFolder, StageName::InstallDependencies])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct BuildContextBuilder {
    artifacts_dir: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    artifacts: Vec<Artifact>,
    stages: Option<Vec<StageName>>,
    layout: LayoutSettings,
    tools: ToolSettings,
    service: Option<ServiceSettings>,
    cancel_on_failure: bool,
}

impl BuildContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the artifacts (scratch) directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn artifacts_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.artifacts_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn build_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds one artifact.
    pub fn artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    /// Replaces the artifact list.
    pub fn artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Narrows the stage chain.
    ///
    /// Default: every stage, with `build_service` only when a service is set.
    pub fn stages(mut self, stages: Vec<StageName>) -> Self {
        self.stages = Some(stages);
        self
    }

    /// Sets the layout settings.
    pub fn layout(mut self, layout: LayoutSettings) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the tool settings.
    pub fn tools(mut self, tools: ToolSettings) -> Self {
        self.tools = tools;
        self
    }

    /// Enables the background service stage.
    pub fn service(mut self, service: ServiceSettings) -> Self {
        self.service = Some(service);
        self
    }

    /// Cancels sibling acquisitions after the first failure.
    ///
    /// Default: false
    pub fn cancel_on_failure(mut self, cancel: bool) -> Self {
        self.cancel_on_failure = cancel;
        self
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// - `artifacts_dir` or `build_dir` missing
    /// - duplicate artifact ids, or two artifacts downloading to one file
    /// - a layout artifact that is not declared while `prepare_build_folder`
    ///   runs
    /// - stages out of canonical order, repeated, or `build_service` without
    ///   a service
    pub fn build(self) -> Result<BuildContext> {
        let artifacts_dir = self
            .artifacts_dir
            .ok_or_else(|| Error::Config("artifacts_dir is required".into()))?;
        let build_dir = self
            .build_dir
            .ok_or_else(|| Error::Config("build_dir is required".into()))?;

        let mut seen = HashSet::new();
        let mut files = HashMap::new();
        for artifact in &self.artifacts {
            if !seen.insert(artifact.id()) {
                return Err(Error::Config(format!(
                    "artifact id `{}` is declared more than once",
                    artifact.id()
                )));
            }

            // Concurrent downloads must never share a target file.
            let file = artifact.source().file_name();
            if let Some(other) = files.insert(file.clone(), artifact.id()) {
                return Err(Error::Config(format!(
                    "artifacts `{}` and `{}` both download to `{}`",
                    other,
                    artifact.id(),
                    file
                )));
            }
        }

        let stages = match self.stages {
            Some(stages) => {
                validate_stage_order(&stages)?;
                if stages.contains(&StageName::BuildService) && self.service.is_none() {
                    return Err(Error::Config(
                        "stage `build_service` requires a [service] section".into(),
                    ));
                }
                stages
            }
            None => StageName::ALL
                .iter()
                .copied()
                .filter(|s| *s != StageName::BuildService || self.service.is_some())
                .collect(),
        };

        if stages.contains(&StageName::PrepareBuildFolder) {
            let layout = [
                ("base_artifact", &self.layout.base_artifact),
                ("app_artifact", &self.layout.app_artifact),
            ];
            for (key, id) in layout {
                if !self.artifacts.iter().any(|a| a.id() == id.as_str()) {
                    return Err(Error::Config(format!(
                        "layout.{key} `{id}` is not a declared artifact"
                    )));
                }
            }
        }

        Ok(BuildContext::new(
            artifacts_dir,
            build_dir,
            self.artifacts,
            stages,
            self.layout,
            self.tools,
            self.service,
            self.cancel_on_failure,
        ))
    }
}

fn validate_stage_order(stages: &[StageName]) -> Result<()> {
    for pair in stages.windows(2) {
        if pair[0].position() >= pair[1].position() {
            return Err(Error::Config(format!(
                "stage `{}` cannot follow `{}`; stages run in the order {}",
                pair[1],
                pair[0],
                StageName::ALL
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            )));
        }
    }
    Ok(())
}
