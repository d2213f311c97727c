//! Top-level error types for the installer CLI.
//!
//! Engine failures arrive as [`crate::bundler::Error`]; this module wraps
//! them together with configuration and argument errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, InstallerError>;

/// Main error type for the installer CLI
#[derive(Error, Debug)]
pub enum InstallerError {
    /// CLI argument and configuration errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON5 configuration errors
    #[error("JSON5 error: {0}")]
    Json5(#[from] json5::Error),

    /// TOML configuration errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pipeline errors
    #[error("Installer error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Configuration file could not be read or validated
    #[error("Invalid configuration {path}: {reason}")]
    InvalidConfig {
        /// Configuration file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

impl InstallerError {
    /// Whether the failure happened before any pipeline work started.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Cli(_)
                | Self::Json(_)
                | Self::Json5(_)
                | Self::Toml(_)
                | Self::Bundler(crate::bundler::Error::Config(_))
        )
    }
}
