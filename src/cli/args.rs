//! Command line argument parsing and validation.

use clap::Parser;
use std::path::PathBuf;

/// Installer pipeline for Electron applications
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_installer",
    version,
    about = "Builds a Windows installer from versioned artifacts",
    long_about = "Downloads every configured artifact concurrently, builds the ones that declare a build \
step, then runs the build stages in order: prepare the build folder, install dependencies, \
package the executable, build the service, shrink the package, copy auxiliary artifacts and \
compile the installer.

Usage:
  kodegen_bundler_installer --config installer.toml
  kodegen_bundler_installer --config artifacts.json5 --build-dir c:/installer
  kodegen_bundler_installer --config installer.toml --artifacts-only

Exit code 0 = every artifact populated and every stage completed."
)]
pub struct Args {
    /// Installer configuration (TOML, or JSON/JSON5 by extension)
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Override the artifacts directory
    #[arg(long, value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Override the build directory
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Cancel in-flight acquisitions after the first failure
    #[arg(long)]
    pub cancel_on_failure: bool,

    /// Populate artifacts and stop before the build stages
    #[arg(long)]
    pub artifacts_only: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.config.as_os_str().is_empty() {
            return Err("Config path cannot be empty".to_string());
        }

        if let (Some(artifacts), Some(build)) = (&self.artifacts_dir, &self.build_dir) {
            if artifacts == build {
                return Err(format!(
                    "Artifacts and build directories must differ: {}",
                    artifacts.display()
                ));
            }
        }

        Ok(())
    }
}
