//! Build-wide stage names.

use serde::Deserialize;
use std::fmt;

/// One step of the build-wide chain, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Wipe the build directory and seed it from artifacts
    PrepareBuildFolder,
    /// Install the application's dependencies
    InstallDependencies,
    /// Package the application executable
    PackageExecutable,
    /// Compile the background service next to the executable
    BuildService,
    /// Prune the packaged application
    ShrinkPackage,
    /// Copy declared artifact outputs into the build tree
    CopyAuxiliaryArtifacts,
    /// Compile the final installer
    CompileInstaller,
}

impl StageName {
    /// Every stage in canonical order.
    pub const ALL: [StageName; 7] = [
        StageName::PrepareBuildFolder,
        StageName::InstallDependencies,
        StageName::PackageExecutable,
        StageName::BuildService,
        StageName::ShrinkPackage,
        StageName::CopyAuxiliaryArtifacts,
        StageName::CompileInstaller,
    ];

    /// Position in the canonical order.
    pub fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or(Self::ALL.len())
    }

    /// Configuration name of the stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrepareBuildFolder => "prepare_build_folder",
            Self::InstallDependencies => "install_dependencies",
            Self::PackageExecutable => "package_executable",
            Self::BuildService => "build_service",
            Self::ShrinkPackage => "shrink_package",
            Self::CopyAuxiliaryArtifacts => "copy_auxiliary_artifacts",
            Self::CompileInstaller => "compile_installer",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage `{s}`"))
    }
}
