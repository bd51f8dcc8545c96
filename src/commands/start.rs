//! `stagectl --start N` - ensure the database, then grow the app fleet.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{ComputeProvider, DnsProvider, LoadBalancer};
use crate::application::services::app_server::{self, AppServerOptions};
use crate::application::services::database::{self, DatabaseOptions};
use crate::domain::StagingConfig;
use crate::output::OutputContext;
use crate::output::reporter::TerminalReporter;

/// Run `stagectl --start N`.
///
/// # Errors
///
/// Returns an error if the database workflow or the fleet launch fails.
pub async fn run(app: &AppContext, count: u32) -> Result<()> {
    execute(
        &app.compute,
        &app.balancer,
        &app.dns,
        &app.output,
        &app.config,
        count,
    )
    .await
}

/// Ensure the database is running, then start and attach `count` app servers.
pub(crate) async fn execute(
    compute: &impl ComputeProvider,
    balancer: &impl LoadBalancer,
    dns: &impl DnsProvider,
    ctx: &OutputContext,
    config: &StagingConfig,
    count: u32,
) -> Result<()> {
    ctx.info(&format!("Starting {count} staging app server(s)"));
    let reporter = TerminalReporter::new(ctx);
    database::ensure_started(compute, dns, &reporter, &DatabaseOptions::from_config(config))
        .await?;
    let started = app_server::start(
        compute,
        balancer,
        &reporter,
        count,
        &AppServerOptions::from_config(config),
    )
    .await?;
    ctx.success(&format!(
        "{started} of {count} app server(s) started and attached"
    ));
    Ok(())
}
