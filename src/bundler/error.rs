//! Error types for the installer pipeline.
//!
//! Every pipeline component reports failure through [`Error`]. The variants
//! follow the fault taxonomy of the pipeline: transfer, extraction, process
//! and filesystem faults, wrapped with the artifact id or stage name where
//! they surfaced.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

use super::builder::StageName;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or stream fault while fetching an artifact.
    #[error("Couldn't download {url}: {reason}")]
    Transfer {
        /// URL being fetched
        url: String,
        /// Transport-level cause
        reason: String,
    },

    /// Downloaded file does not match the configured digest.
    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Downloaded file
        file: PathBuf,
        /// Configured SHA-256
        expected: String,
        /// Computed SHA-256
        actual: String,
    },

    /// Archive corruption, unexpected archive shape or archive library crash.
    #[error("Couldn't unzip {archive}: {reason}")]
    Extract {
        /// Archive file name
        archive: String,
        /// Underlying fault
        reason: String,
    },

    /// A spawned command exited with a non-zero code.
    #[error("`{command}` in {} exited with {}", working_dir.display(), format_exit_code(*exit_code))]
    Process {
        /// Full command line
        command: String,
        /// Directory the command ran in
        working_dir: PathBuf,
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
    },

    /// A command could not be spawned at all.
    #[error("Failed to execute `{command}`: {error}")]
    CommandFailed {
        /// Full command line
        command: String,
        /// Spawn error
        #[source]
        error: io::Error,
    },

    /// An artifact's build directive failed.
    #[error("Couldn't build artifact in {}: {source}", output_dir.display())]
    BuildFailed {
        /// Output folder of the artifact
        output_dir: PathBuf,
        /// Process failure
        #[source]
        source: Box<Error>,
    },

    /// Filesystem operation failed.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: io::Error,
    },

    /// An artifact's state machine failed.
    #[error("Artifact `{id}` failed: {reason}")]
    Artifact {
        /// Artifact id
        id: String,
        /// Failure reported by the state machine
        reason: Box<Error>,
    },

    /// A build-wide stage failed.
    #[error("Stage `{stage}` failed: {reason}")]
    Stage {
        /// Failing stage
        stage: StageName,
        /// Failure reported by the stage
        reason: Box<Error>,
    },

    /// Work was abandoned because a sibling failed.
    #[error("Cancelled after a sibling artifact failed")]
    Cancelled,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error without further context.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// Directory traversal error.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix error while mirroring trees.
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

fn format_exit_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Wraps this error with the id of the artifact that produced it.
    pub fn for_artifact(self, id: impl Into<String>) -> Self {
        Error::Artifact {
            id: id.into(),
            reason: Box::new(self),
        }
    }

    /// Wraps this error with the stage that produced it.
    pub fn for_stage(self, stage: StageName) -> Self {
        Error::Stage {
            stage,
            reason: Box::new(self),
        }
    }
}

/// Attaches filesystem context to `io::Result`s.
pub trait ErrorExt<T> {
    /// Converts the error into [`Error::Fs`] naming the operation and path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Turns missing values and foreign errors into [`Error::GenericError`].
pub trait Context<T> {
    /// Adds a message describing what was expected.
    fn context<C: Display>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }
}

/// Returns early with a formatted [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}
