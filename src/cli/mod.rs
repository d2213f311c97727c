//! Command line interface for the installer pipeline.

mod args;

pub use args::Args;

use crate::bundler::{BuildContext, Installer};
use crate::config::load_config;
use crate::error::{CliError, Result};
use path_absolutize::Absolutize;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    run_with(args).await
}

/// Runs the pipeline for already parsed arguments.
pub async fn run_with(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let context = build_context(&args)?;
    log::info!(
        "Building from {} into {}",
        context.artifacts_dir().display(),
        context.build_dir().display()
    );

    let installer = Installer::new(context)?;

    if args.artifacts_only {
        let ready = installer.populate_artifacts().await?;
        log::info!("{} artifact(s) ready", ready.len());
    } else {
        let report = installer.run().await?;
        log::info!(
            "{} artifact(s) populated, {} stage(s) completed",
            report.artifacts.len(),
            report.stages.len()
        );
    }

    Ok(0)
}

/// Loads the configuration and applies command line overrides.
pub fn build_context(args: &Args) -> Result<BuildContext> {
    let mut context = load_config(&args.config)?;

    if let Some(dir) = &args.artifacts_dir {
        context.set_artifacts_dir(dir.absolutize()?.into_owned());
    }
    if let Some(dir) = &args.build_dir {
        context.set_build_dir(dir.absolutize()?.into_owned());
    }
    if args.cancel_on_failure {
        context.set_cancel_on_failure(true);
    }

    if context.artifacts_dir() == context.build_dir() {
        return Err(CliError::InvalidArguments {
            reason: format!(
                "Artifacts and build directories must differ: {}",
                context.build_dir().display()
            ),
        }
        .into());
    }

    Ok(context)
}
