//! `stagectl --restart N` - upload, drain, ensure database, regrow the fleet.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{ArtifactStore, ComputeProvider, DnsProvider, LoadBalancer};
use crate::application::services::app_server::{self, AppServerOptions};
use crate::application::services::database::{self, DatabaseOptions};
use crate::commands::upload;
use crate::domain::StagingConfig;
use crate::output::OutputContext;
use crate::output::reporter::TerminalReporter;

/// Run `stagectl --restart N`.
///
/// # Errors
///
/// Returns an error if any step of the restart sequence fails; completed
/// steps are not rolled back.
pub async fn run(app: &AppContext, count: u32) -> Result<()> {
    execute(
        &app.compute,
        &app.balancer,
        &app.store,
        &app.dns,
        &app.output,
        &app.config,
        count,
    )
    .await
}

/// The restart sequence, in its fixed order: upload the artifact, drain and
/// terminate the current app servers, ensure the database, then start and
/// attach `count` fresh app servers. The database is never stopped here.
pub(crate) async fn execute(
    compute: &impl ComputeProvider,
    balancer: &impl LoadBalancer,
    store: &impl ArtifactStore,
    dns: &impl DnsProvider,
    ctx: &OutputContext,
    config: &StagingConfig,
    count: u32,
) -> Result<()> {
    ctx.info(&format!("Restarting staging with {count} app server(s)"));

    upload::perform(store, ctx, config).await?;

    let reporter = TerminalReporter::new(ctx);
    let drained = app_server::stop_all(compute, balancer, &reporter, &config.load_balancer).await?;
    ctx.success(&format!("{drained} old app server(s) terminated"));

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
