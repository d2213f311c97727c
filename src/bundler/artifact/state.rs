//! Acquisition states of a single artifact.

use std::fmt;

/// Where an artifact is in its acquisition.
///
/// `Pending → Downloading → Downloaded → Extracting → Extracted → Building →
/// Ready`, with `Failed` reachable from any non-terminal state. Extraction and
/// building are skipped when the artifact does not need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    Pending,
    Downloading,
    Downloaded,
    Extracting,
    Extracted,
    Building,
    Ready,
    Failed(String),
}

impl AcquisitionState {
    /// `Ready` and `Failed` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Downloading => f.write_str("downloading"),
            Self::Downloaded => f.write_str("downloaded"),
            Self::Extracting => f.write_str("extracting"),
            Self::Extracted => f.write_str("extracted"),
            Self::Building => f.write_str("building"),
            Self::Ready => f.write_str("ready"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
