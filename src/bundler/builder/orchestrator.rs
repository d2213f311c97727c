//! Main installer orchestration.
//!
//! This module provides the [`Installer`] that chains artifact population
//! and the build-wide stages into one run.

use super::{StageName, StageSequencer};
use crate::bundler::{
    Result,
    artifact::{ArtifactCoordinator, ReadyArtifact},
    error::Error,
    settings::BuildContext,
};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct InstallerReport {
    /// Artifacts that reached `Ready`
    pub artifacts: Vec<ReadyArtifact>,
    /// Stages that ran, in order
    pub stages: Vec<StageName>,
}

/// Main installer orchestrator.
///
/// Populates every artifact concurrently, then runs the stage chain once the
/// aggregate "populated" signal arrives. The first failure anywhere ends the
/// run and is returned to the caller.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_installer::bundler::{BuildContext, Installer};
///
/// # async fn example(context: BuildContext) -> kodegen_bundler_installer::bundler::Result<()> {
/// let installer = Installer::new(context)?;
/// let report = installer.run().await?;
/// println!("Populated {} artifacts", report.artifacts.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Installer {
    context: BuildContext,
    client: reqwest::Client,
}

impl Installer {
    /// Creates an installer for `context`.
    pub fn new(context: BuildContext) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::GenericError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { context, client })
    }

    /// Returns the build context.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Acquires every configured artifact.
    pub async fn populate_artifacts(&self) -> Result<Vec<ReadyArtifact>> {
        let coordinator =
            ArtifactCoordinator::new(self.context.artifacts_dir(), self.client.clone())
                .cancel_on_failure(self.context.cancel_on_failure());

        let ready = coordinator.populate_all(self.context.artifacts()).await?;
        log::info!("Artifacts successfully populated");
        Ok(ready)
    }

    /// Runs the build-wide stage chain over already populated artifacts.
    pub async fn build(&self, populated: &[ReadyArtifact]) -> Result<Vec<StageName>> {
        StageSequencer::new(&self.context)
            .with_populated(populated)
            .run()
            .await
    }

    /// Populates the artifacts, then runs the stage chain.
    pub async fn run(&self) -> Result<InstallerReport> {
        let artifacts = self.populate_artifacts().await?;
        let stages = self.build(&artifacts).await?;

        Ok(InstallerReport { artifacts, stages })
    }
}
