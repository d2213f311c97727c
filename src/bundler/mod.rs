//! Installer pipeline engine.
//!
//! Acquires artifacts concurrently, then drives the packaging toolchain
//! through a fixed chain of stages:
//!
//! 1. [`ArtifactCoordinator`] wipes the artifacts directory and runs one
//!    [`ArtifactMachine`] per artifact (fetch → extract → build → ready)
//! 2. [`StageSequencer`] runs the build-wide stages strictly in order
//! 3. [`Installer`] chains both and stops at the first failure

pub mod artifact;
pub mod builder;
pub mod error;
pub mod process;
pub mod settings;
pub mod utils;

pub use artifact::{AcquisitionState, ArtifactCoordinator, ArtifactMachine, ReadyArtifact};
pub use builder::{Installer, InstallerReport, StageName, StageSequencer};
pub use error::{Error, Result};
pub use process::{ProcessOutput, ProcessRunner};
pub use settings::{
    Artifact, ArtifactSource, BuildContext, BuildContextBuilder, BuildDirective, CommandSpec,
    CompilerSettings, FileCopy, LayoutSettings, PackagerSettings, ServiceSettings, ToolSettings,
};
