//! Background service build.
//!
//! The service ships next to the packaged executable: its dependencies are
//! installed fresh, it is compiled to a standalone binary, and the native
//! modules and config it loads at runtime are copied beside it.

use crate::bundler::{
    Result,
    error::Context,
    process::{ProcessRunner, shell_quote},
    settings::{BuildContext, FileCopy},
    utils::fs,
};

/// Installs, compiles and lays out the background service.
pub async fn build_service(ctx: &BuildContext, runner: &ProcessRunner) -> Result<()> {
    let service = ctx.service().context("no [service] section configured")?;
    let service_dir = ctx
        .service_dir()
        .context("no [service] section configured")?;

    fs::remove_dir_all(&service_dir.join("node_modules")).await?;
    runner
        .run(&service.install.command, &service.install.arguments, &service_dir)
        .await?;

    copy_all(ctx, &service.before_compile).await?;

    let compile_args: Vec<String> = service
        .compile
        .arguments
        .iter()
        .map(|arg| shell_quote(&ctx.expand(arg)))
        .collect();
    runner
        .run(&service.compile.command, &compile_args, &service_dir)
        .await?;

    copy_all(ctx, &service.after_compile).await?;
    Ok(())
}

async fn copy_all(ctx: &BuildContext, copies: &[FileCopy]) -> Result<()> {
    for copy in copies {
        let from = ctx.resolve(&copy.from);
        let to = ctx.resolve(&copy.to);
        fs::copy_file(&from, &to).await?;
        log::info!("Copied {} to {}", from.display(), to.display());
    }
    Ok(())
}
