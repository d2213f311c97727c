//! Fan-out/fan-in over all configured artifacts.

use super::ArtifactMachine;
use crate::bundler::{
    error::{Error, Result},
    settings::Artifact,
    utils::fs,
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// An artifact that reached `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyArtifact {
    /// Artifact id
    pub id: String,
    /// Output directory (or file, for plain downloads)
    pub path: PathBuf,
}

/// Populates every artifact concurrently and reports one aggregate result.
#[derive(Debug, Clone)]
pub struct ArtifactCoordinator {
    scratch_dir: PathBuf,
    client: reqwest::Client,
    cancel_on_failure: bool,
}

impl ArtifactCoordinator {
    /// Creates a coordinator owning `scratch_dir`.
    pub fn new(scratch_dir: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            client,
            cancel_on_failure: false,
        }
    }

    /// Cancels in-flight siblings after the first failure.
    ///
    /// Default: false (siblings run to completion in the background).
    pub fn cancel_on_failure(mut self, cancel: bool) -> Self {
        self.cancel_on_failure = cancel;
        self
    }

    /// Returns the scratch directory.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Wipes the scratch directory and acquires every artifact.
    ///
    /// Succeeds once all artifacts are ready, in completion order. Fails as
    /// soon as any artifact fails, carrying that artifact's id and reason;
    /// siblings are not awaited.
    pub async fn populate_all(&self, artifacts: &[Artifact]) -> Result<Vec<ReadyArtifact>> {
        fs::create_dir_all(&self.scratch_dir, true).await?;

        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        for artifact in artifacts {
            log::info!("Populating: {}", artifact.id());

            let mut machine =
                ArtifactMachine::new(artifact.clone(), &self.scratch_dir, self.client.clone());
            if self.cancel_on_failure {
                machine = machine.with_cancellation(token.clone());
            }

            let tx = tx.clone();
            tokio::spawn(async move {
                let result = machine.populate().await;
                // The receiver is gone once an earlier sibling failed.
                let _ = tx.send((machine.id().to_string(), result));
            });
        }
        drop(tx);

        let mut ready = Vec::with_capacity(artifacts.len());
        while let Some((id, result)) = rx.recv().await {
            match result {
                Ok(path) => {
                    log::info!("Artifact {} has been populated", id);
                    ready.push(ReadyArtifact { id, path });
                }
                Err(e) => {
                    log::error!("Artifact {} failed: {}", id, e);
                    if self.cancel_on_failure {
                        token.cancel();
                    }
                    return Err(e.for_artifact(id));
                }
            }
        }

        if ready.len() != artifacts.len() {
            let missing: Vec<_> = artifacts
                .iter()
                .map(Artifact::id)
                .filter(|id| !ready.iter().any(|r| r.id == *id))
                .collect();
            return Err(Error::GenericError(format!(
                "artifact tasks ended without reporting: {}",
                missing.join(", ")
            )));
        }

        Ok(ready)
    }
}
