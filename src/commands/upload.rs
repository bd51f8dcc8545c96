//! `stagectl --upload` - push the build artifact to the staging bucket.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ArtifactStore;
use crate::application::services::artifact;
use crate::domain::StagingConfig;
use crate::output::{OutputContext, progress};

/// Run `stagectl --upload`.
///
/// # Errors
///
/// Returns an error if the artifact is missing or the transfer fails.
pub async fn run(app: &AppContext) -> Result<()> {
    perform(&app.store, &app.output, &app.config).await
}

/// Upload with progress rendering. Shared by `--upload` and the restart
/// sequence.
pub(crate) async fn perform(
    store: &impl ArtifactStore,
    ctx: &OutputContext,
    config: &StagingConfig,
) -> Result<()> {
    ctx.info(&format!(
        "Uploading {} to s3://{}/{}",
        config.artifact.display(),
        config.bucket,
        config.object_key
    ));

    let bar = ctx
        .show_progress()
        .then(|| progress::bar(0, "uploading artifact"));
    let mut on_progress = |done: u64, total: u64| {
        if let Some(bar) = &bar {
            bar.set_length(total);
            bar.set_position(done);
        }
    };

    let result = artifact::upload(
        store,
        &config.artifact,
        &config.bucket,
        &config.object_key,
        &mut on_progress,
    )
    .await;

    match (&bar, &result) {
        (Some(bar), Ok(bytes)) => progress::finish_success(bar, &format!("uploaded {bytes} bytes")),
        (Some(bar), Err(_)) => progress::finish_error(bar, "upload failed"),
        (None, Ok(bytes)) => ctx.success(&format!("uploaded {bytes} bytes")),
        (None, Err(_)) => ctx.error("upload failed"),
    }
    result.map(|_| ())
}
