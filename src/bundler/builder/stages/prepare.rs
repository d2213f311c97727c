//! Build folder preparation.

use crate::bundler::{Result, settings::BuildContext, utils::fs};
use std::collections::HashMap;
use std::path::PathBuf;

/// Wipes the build directory and seeds it from the populated artifacts.
///
/// The base artifact (the installer project) becomes the build root and the
/// application artifact lands in `<build>/<app_artifact>`. Sources come from
/// `populated` (artifact id to output folder); artifacts missing from it are
/// looked up as `<artifacts>/<id>`.
pub async fn prepare_build_folder(
    ctx: &BuildContext,
    populated: &HashMap<String, PathBuf>,
) -> Result<()> {
    let layout = ctx.layout();
    let build_dir = ctx.build_dir();
    let source = |id: &str| {
        populated
            .get(id)
            .cloned()
            .unwrap_or_else(|| ctx.artifacts_dir().join(id))
    };

    fs::remove_dir_all(build_dir).await?;

    let base = source(&layout.base_artifact);
    fs::copy_dir(&base, build_dir).await?;
    log::info!("Copied {} to {}", base.display(), build_dir.display());

    let app = source(&layout.app_artifact);
    let app_dir = ctx.app_dir();
    fs::copy_dir(&app, &app_dir).await?;
    log::info!("Copied {} to {}", app.display(), app_dir.display());

    Ok(())
}
