//! `stagectl --stop` - drain and terminate staging app servers only.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::app_server;

/// Run `stagectl --stop`.
///
/// # Errors
///
/// Returns an error if draining or terminating the fleet fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let ctx = &app.output;
    ctx.info("Stopping staging app servers");
    let terminated = app_server::stop_all(
        &app.compute,
        &app.balancer,
        &app.reporter(),
        &app.config.load_balancer,
    )
    .await?;
    ctx.success(&format!("{terminated} staging app server(s) terminated"));
    Ok(())
}
