//! Auxiliary artifact copying.

use crate::bundler::{Result, error::Context, settings::BuildContext, utils::fs};

/// Copies every declared artifact output into the build tree.
///
/// `<artifacts>/<output>` goes to `<build>/<output_path>`; parents are
/// created as needed.
pub async fn copy_auxiliary_artifacts(ctx: &BuildContext) -> Result<()> {
    for artifact in ctx.artifacts() {
        let Some(output_path) = artifact.output_path() else {
            continue;
        };
        let output = artifact
            .output()
            .context(format!(
                "artifact `{}` declares output_path without output",
                artifact.id()
            ))?;

        let source = ctx.artifacts_dir().join(output);
        let target = ctx.build_dir().join(output_path);
        fs::copy_file(&source, &target).await?;
        log::info!("Copied {} to {}", source.display(), target.display());
    }
    Ok(())
}
