//! Size reduction of the packaged application.

use crate::bundler::{Result, process::ProcessRunner, settings::BuildContext, utils::fs};

/// Runs the shrink steps in order, then drops bulky modules.
///
/// The first failing step ends the stage.
pub async fn shrink_package(ctx: &BuildContext, runner: &ProcessRunner) -> Result<()> {
    let tools = ctx.tools();
    let app_dir = ctx.packaged_app_dir();

    for step in &tools.shrink_steps {
        runner.run(&step.command, &step.arguments, &app_dir).await?;
    }

    let modules = app_dir.join("node_modules");
    for module in &tools.prune_modules {
        let path = modules.join(module);
        fs::remove_dir_all(&path).await?;
        log::debug!("Removed {}", path.display());
    }
    Ok(())
}
