//! `stagectl --stop-all` - retire the whole staging environment.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{app_server, database};

/// Run `stagectl --stop-all`.
///
/// # Errors
///
/// Returns an error if the confirmation prompt or any terminate call fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let ctx = &app.output;
    if !app.confirm(
        "Terminate all staging app servers and the staging database?",
        true,
    )? {
        ctx.info("Aborted.");
        return Ok(());
    }

    ctx.info("Stopping staging app servers");
    let reporter = app.reporter();
    let apps = app_server::stop_all(
        &app.compute,
        &app.balancer,
        &reporter,
        &app.config.load_balancer,
    )
    .await?;

    ctx.info("Stopping staging database");
    let dbs = database::stop(&app.compute, &reporter).await?;

    ctx.success(&format!(
        "{apps} app server(s) and {dbs} database instance(s) terminated"
    ));
    Ok(())
}
