//! Artifact acquisition.
//!
//! # Module Organization
//!
//! - [`transfer`] - Resolving sources and downloading them
//! - [`extract`] - Archive expansion and folder normalization
//! - [`checksum`] - SHA-256 verification of downloads
//! - [`machine`] - Per-artifact state machine
//! - [`coordinator`] - Concurrent population of all artifacts

pub mod checksum;
mod coordinator;
pub mod extract;
mod machine;
mod state;
pub mod transfer;

pub use coordinator::{ArtifactCoordinator, ReadyArtifact};
pub use machine::ArtifactMachine;
pub use state::AcquisitionState;
