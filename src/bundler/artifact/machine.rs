//! Per-artifact acquisition state machine.

use super::{AcquisitionState, extract::extract, transfer::acquire};
use crate::bundler::{
    error::{Error, Result},
    process::ProcessRunner,
    settings::Artifact,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Drives one artifact through fetch → extract → build → ready.
///
/// Each step starts only after the previous one fully completed. A failure at
/// any step is terminal; there are no retries at this layer.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_installer::bundler::{Artifact, ArtifactMachine, ArtifactSource};
///
/// # async fn example() -> kodegen_bundler_installer::bundler::Result<()> {
/// let artifact = Artifact::new(
///     "demo",
///     ArtifactSource::Repository {
///         root: "https://example/demo".into(),
///         hash: "abc123".into(),
///     },
/// );
/// let mut machine = ArtifactMachine::new(artifact, "artifacts", reqwest::Client::new());
/// let path = machine.populate().await?;
/// assert!(path.ends_with("demo"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArtifactMachine {
    artifact: Artifact,
    scratch_dir: PathBuf,
    client: reqwest::Client,
    cancel: Option<CancellationToken>,
    state: AcquisitionState,
    history: Vec<AcquisitionState>,
}

impl ArtifactMachine {
    /// Creates a machine in the `Pending` state.
    pub fn new(artifact: Artifact, scratch_dir: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        Self {
            artifact,
            scratch_dir: scratch_dir.into(),
            client,
            cancel: None,
            state: AcquisitionState::Pending,
            history: vec![AcquisitionState::Pending],
        }
    }

    /// Observes `token` during downloads and builds.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the artifact id.
    pub fn id(&self) -> &str {
        self.artifact.id()
    }

    /// Returns the artifact, with its output directory set once ready.
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Returns the current state.
    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    /// Returns every state visited so far, starting with `Pending`.
    pub fn history(&self) -> &[AcquisitionState] {
        &self.history
    }

    /// Runs the acquisition to a terminal state.
    ///
    /// Returns the artifact's output path on `Ready`, or the failure that
    /// moved it to `Failed`. Calling this again after a terminal state
    /// returns an error without touching the filesystem.
    pub async fn populate(&mut self) -> Result<PathBuf> {
        if self.state.is_terminal() {
            return Err(Error::GenericError(format!(
                "artifact `{}` is already {}",
                self.id(),
                self.state
            )));
        }

        match self.drive().await {
            Ok(path) => {
                self.advance(AcquisitionState::Ready);
                Ok(path)
            }
            Err(e) => {
                self.advance(AcquisitionState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<PathBuf> {
        self.advance(AcquisitionState::Downloading);
        let fetched = acquire(
            &self.client,
            &self.artifact,
            &self.scratch_dir,
            self.cancel.as_ref(),
        )
        .await?;
        self.advance(AcquisitionState::Downloaded);

        let output = if self.artifact.source().needs_extraction() {
            self.advance(AcquisitionState::Extracting);
            let folder = extract(&fetched, &self.scratch_dir).await?;
            self.advance(AcquisitionState::Extracted);
            folder
        } else {
            fetched
        };

        if let Some(build) = self.artifact.build().cloned() {
            self.advance(AcquisitionState::Building);
            let runner = match &self.cancel {
                Some(token) => ProcessRunner::with_cancellation(token.clone()),
                None => ProcessRunner::new(),
            };
            let working_dir = build_dir_for(&output, &self.scratch_dir);
            match runner.run(&build.command, &build.arguments, working_dir).await {
                Ok(_) => {}
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    return Err(Error::BuildFailed {
                        output_dir: output,
                        source: Box::new(e),
                    });
                }
            }
        }

        if !self.artifact.set_output_dir(output.clone()) {
            log::warn!("Output directory of `{}` was already recorded", self.id());
        }
        Ok(output)
    }

    fn advance(&mut self, next: AcquisitionState) {
        if self.state.is_terminal() {
            log::warn!(
                "Ignoring transition of `{}` from {} to {}",
                self.artifact.id(),
                self.state,
                next
            );
            return;
        }
        log::debug!("{}: {} -> {}", self.artifact.id(), self.state, next);
        self.history.push(next.clone());
        self.state = next;
    }
}

fn build_dir_for<'a>(output: &'a Path, scratch_dir: &'a Path) -> &'a Path {
    if output.is_dir() { output } else { scratch_dir }
}
