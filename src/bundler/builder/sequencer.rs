//! Strictly ordered execution of the build-wide stages.

use super::{StageName, stages};
use crate::bundler::{
    Result, artifact::ReadyArtifact, process::ProcessRunner, settings::BuildContext,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// Runs the context's stages one after another.
///
/// Each stage starts only after the previous one succeeded. The first failure
/// is wrapped with the stage's name and ends the chain; later stages never
/// run and nothing is retried.
#[derive(Debug)]
pub struct StageSequencer<'a> {
    context: &'a BuildContext,
    runner: ProcessRunner,
    populated: HashMap<String, PathBuf>,
}

impl<'a> StageSequencer<'a> {
    /// Creates a sequencer over `context`.
    pub fn new(context: &'a BuildContext) -> Self {
        Self {
            context,
            runner: ProcessRunner::new(),
            populated: HashMap::new(),
        }
    }

    /// Seeds the build folder from where the coordinator put each artifact.
    pub fn with_populated(mut self, ready: &[ReadyArtifact]) -> Self {
        self.populated = ready
            .iter()
            .map(|r| (r.id.clone(), r.path.clone()))
            .collect();
        self
    }

    /// Runs every configured stage, returning the ones that completed.
    pub async fn run(&self) -> Result<Vec<StageName>> {
        let mut completed = Vec::with_capacity(self.context.stages().len());

        for &stage in self.context.stages() {
            log::info!("Running stage {}", stage);
            self.run_stage(stage)
                .await
                .map_err(|e| e.for_stage(stage))?;
            log::info!("{}", completion_message(stage));
            completed.push(stage);
        }

        Ok(completed)
    }

    /// Runs a single stage.
    pub async fn run_stage(&self, stage: StageName) -> Result<()> {
        let ctx = self.context;
        let runner = &self.runner;

        match stage {
            StageName::PrepareBuildFolder => {
                stages::prepare_build_folder(ctx, &self.populated).await
            }
            StageName::InstallDependencies => stages::install_dependencies(ctx, runner).await,
            StageName::PackageExecutable => stages::package_executable(ctx, runner).await,
            StageName::BuildService => stages::build_service(ctx, runner).await,
            StageName::ShrinkPackage => stages::shrink_package(ctx, runner).await,
            StageName::CopyAuxiliaryArtifacts => stages::copy_auxiliary_artifacts(ctx).await,
            StageName::CompileInstaller => stages::compile_installer(ctx, runner).await,
        }
    }
}

fn completion_message(stage: StageName) -> &'static str {
    match stage {
        StageName::PrepareBuildFolder => "Build folder ready",
        StageName::InstallDependencies => "Dependency install succeeded",
        StageName::PackageExecutable => "Application successfully packaged",
        StageName::BuildService => "Service successfully created",
        StageName::ShrinkPackage => "Shrunk size of node_modules folder",
        StageName::CopyAuxiliaryArtifacts => "Copied auxiliary artifacts",
        StageName::CompileInstaller => "Installer compilation complete",
    }
}
