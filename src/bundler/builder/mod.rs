//! Build-wide stage chain and run orchestration.
//!
//! # Module Organization
//!
//! - [`stage`] - Stage names and their canonical order
//! - [`stages`] - One function per stage
//! - [`sequencer`] - Strictly ordered, fail-fast execution of the chain
//! - [`orchestrator`] - [`Installer`], populating artifacts then building

mod orchestrator;
mod sequencer;
mod stage;
pub mod stages;

pub use orchestrator::{Installer, InstallerReport};
pub use sequencer::StageSequencer;
pub use stage::StageName;
