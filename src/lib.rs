//! Installer pipeline library.
//!
//! Acquires versioned artifacts concurrently, builds the ones that need it,
//! and drives the ordered build stages that turn them into a Windows
//! installer. It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, InstallerError, Result};
