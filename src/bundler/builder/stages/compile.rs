//! Final installer compilation.

use crate::bundler::{
    Result,
    error::{Error, ErrorExt},
    process::{ProcessRunner, shell_quote},
    settings::BuildContext,
    utils::fs,
};
use std::path::PathBuf;

/// Creates the output and temp folders, then runs the compile script.
///
/// The script steps (environment bootstrap, build-tool lookup, compile) are
/// joined into one shell invocation so they share the environment.
pub async fn compile_installer(ctx: &BuildContext, runner: &ProcessRunner) -> Result<()> {
    let compiler = &ctx.tools().compiler;
    let build_dir = ctx.build_dir();

    fs::create_dir_all(&build_dir.join(&compiler.output_dir), false).await?;
    fs::create_dir_all(&build_dir.join(&compiler.temp_dir), false).await?;

    let shell = match &compiler.shell {
        Some(shell) => shell.clone(),
        None => find_powershell()?.to_string_lossy().into_owned(),
    };

    let script = compiler
        .script
        .iter()
        .map(|step| ctx.expand(step))
        .collect::<Vec<_>>()
        .join("; ");

    let mut args = compiler.shell_args.clone();
    args.push(shell_quote(&script));

    let working_dir = match &compiler.working_dir {
        Some(dir) => ctx.resolve(dir),
        None => std::env::current_dir().fs_context("reading current directory", ".")?,
    };

    runner.run(&shell_quote(&shell), &args, &working_dir).await?;
    log::info!("Installer compiled into {}", build_dir.join(&compiler.output_dir).display());
    Ok(())
}

/// Locates PowerShell, preferring `pwsh`.
fn find_powershell() -> Result<PathBuf> {
    which::which("pwsh")
        .or_else(|_| which::which("powershell"))
        .map_err(|e| {
            Error::GenericError(format!(
                "PowerShell not found in PATH ({e}); set tools.compiler.shell"
            ))
        })
}
