//! Dependency installation and executable packaging.

use crate::bail;
use crate::bundler::{
    Result,
    process::{ProcessRunner, shell_quote},
    settings::{BuildContext, PackagerSettings},
    utils::fs,
};
use std::path::Path;

/// Runs the dependency installer in the application directory.
pub async fn install_dependencies(ctx: &BuildContext, runner: &ProcessRunner) -> Result<()> {
    let install = &ctx.tools().install;
    runner
        .run(&install.command, &install.arguments, &ctx.app_dir())
        .await?;
    Ok(())
}

/// Packages the application and normalizes the output directory name.
///
/// The packager writes `<staging>/<name>-<platform>-<arch>`; on success that
/// directory is renamed to `<staging>/<staging_name>`, replacing a previous
/// one.
pub async fn package_executable(ctx: &BuildContext, runner: &ProcessRunner) -> Result<()> {
    let packager = &ctx.tools().packager;
    let app_dir = ctx.app_dir();
    let staging_root = ctx.staging_root();

    let args = packager_arguments(packager, &app_dir, &staging_root);
    runner.run(&packager.command, &args, ctx.build_dir()).await?;

    let produced = staging_root.join(packager.output_dir_name());
    if !produced.is_dir() {
        bail!("{} did not produce {}", packager.command, produced.display());
    }

    let staging_dir = ctx.staging_dir();
    fs::replace_dir(&produced, &staging_dir).await?;
    log::info!("Packaged application into {}", staging_dir.display());
    Ok(())
}

/// Builds the packager command line from its descriptor.
pub fn packager_arguments(
    packager: &PackagerSettings,
    app_dir: &Path,
    staging_root: &Path,
) -> Vec<String> {
    let mut args = vec![
        shell_quote(&app_dir.to_string_lossy()),
        shell_quote(&packager.name),
        format!("--platform={}", shell_quote(&packager.platform)),
        format!("--arch={}", shell_quote(&packager.arch)),
        format!("--out={}", shell_quote(&staging_root.to_string_lossy())),
        "--overwrite".to_string(),
    ];
    if let Some(version) = &packager.app_version {
        args.push(format!("--app-version={}", shell_quote(version)));
    }
    if let Some(copyright) = &packager.copyright {
        args.push(format!("--app-copyright={}", shell_quote(copyright)));
    }
    for (key, value) in &packager.metadata {
        args.push(format!("--win32metadata.{}={}", key, shell_quote(value)));
    }
    args
}
