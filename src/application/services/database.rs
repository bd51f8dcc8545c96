//! Staging database control: ensure-one-running plus DNS cutover, and stop.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{ComputeProvider, DnsProvider, ProgressReporter};
use crate::application::services::launcher;
use crate::domain::{LaunchTemplate, PollSettings, ProvisionError, StagingConfig};

/// `Name` tag identifying the staging database instance.
pub const DB_NAME_TAG: &str = "Staging Database";
/// `Name` tag applied when the database instance fails to start.
const DB_DEAD_TAG: &str = "Dead--Staging Database";

const DB_IMAGE: &str = "ami-0e2c8caa4b6378d8c";
const DB_INSTANCE_TYPE: &str = "m5.large";
const DB_PLACEMENT: &str = "us-east-1a";
const DB_SECURITY_GROUPS: &[&str] = &["staging-db"];
const DB_INSTANCE_PROFILE: &str = "arn:aws:iam::123456789012:instance-profile/StagingDatabase";

/// Key pair shared by all staging instances.
pub(crate) const KEY_NAME: &str = "staging-ops";

/// Inputs for the database workflow.
pub struct DatabaseOptions<'a> {
    /// Boot script passed to the new instance.
    pub user_data: &'a Path,
    /// Hosted zone containing the database record.
    pub zone: &'a str,
    /// A-record pointed at the database's private address.
    pub record: &'a str,
    /// Launch polling parameters.
    pub poll: PollSettings,
    /// Wait after the DNS update for caches to expire the old address.
    pub dns_grace: Duration,
}

impl<'a> DatabaseOptions<'a> {
    #[must_use]
    pub fn from_config(config: &'a StagingConfig) -> Self {
        Self {
            user_data: &config.db_user_data,
            zone: &config.zone,
            record: &config.record,
            poll: config.poll(),
            dns_grace: config.dns_grace,
        }
    }
}

/// Ensure exactly one staging database instance is running and the staging
/// database record points at it.
///
/// A database instance that is already running or pending makes this a
/// no-op: no launch request is issued and DNS is left alone. The check is
/// best-effort - a race between check and launch is accepted.
///
/// # Errors
///
/// Returns [`ProvisionError::DatabaseLaunchFailed`] if the launch produced
/// no running instance, or any provider/file error encountered on the way.
pub async fn ensure_started(
    compute: &impl ComputeProvider,
    dns: &impl DnsProvider,
    reporter: &impl ProgressReporter,
    opts: &DatabaseOptions<'_>,
) -> Result<()> {
    let existing = compute
        .instances_named(DB_NAME_TAG)
        .await
        .context("querying staging database instances")?;
    if existing.iter().any(|i| i.state.is_alive()) {
        reporter.success("staging database already running");
        return Ok(());
    }

    let user_data = std::fs::read_to_string(opts.user_data).with_context(|| {
        format!(
            "reading database user-data script {}",
            opts.user_data.display()
        )
    })?;
    let template = LaunchTemplate {
        image_id: DB_IMAGE,
        instance_type: DB_INSTANCE_TYPE,
        availability_zone: Some(DB_PLACEMENT),
        key_name: KEY_NAME,
        security_groups: DB_SECURITY_GROUPS,
        instance_profile_arn: DB_INSTANCE_PROFILE,
        user_data: &user_data,
        success_tag: DB_NAME_TAG,
        failure_tag: DB_DEAD_TAG,
    };

    let started = launcher::launch(compute, reporter, &template, 1, opts.poll).await?;
    let Some(id) = started.first() else {
        return Err(ProvisionError::DatabaseLaunchFailed.into());
    };

    let address = private_address(compute, id).await?;
    dns.update_a_record(opts.zone, opts.record, &address)
        .await
        .with_context(|| format!("updating record '{}'", opts.record))?;
    reporter.success(&format!("{} now resolves to {address}", opts.record));

    wait_for_dns(reporter, opts.dns_grace).await;
    Ok(())
}

/// Terminate every staging database instance found running or pending.
/// Returns the number terminated.
///
/// # Errors
///
/// Returns an error if the query or any terminate call fails.
pub async fn stop(
    compute: &impl ComputeProvider,
    reporter: &impl ProgressReporter,
) -> Result<usize> {
    let instances = compute
        .instances_named(DB_NAME_TAG)
        .await
        .context("querying staging database instances")?;
    let mut terminated = 0;
    for instance in instances {
        if instance.state.is_alive() {
            compute
                .terminate(&instance.id)
                .await
                .with_context(|| format!("terminating {}", instance.id))?;
            reporter.success(&format!("terminated {}", instance.id));
            terminated += 1;
        }
    }
    Ok(terminated)
}

async fn private_address(compute: &impl ComputeProvider, id: &str) -> Result<String> {
    let instance = compute
        .describe_instance(id)
        .await
        .with_context(|| format!("describing {id}"))?;
    instance
        .private_ip
        .ok_or_else(|| anyhow::anyhow!("instance {id} has no private address"))
}

/// Block out the DNS grace window so cached lookups expire before callers
/// start resolving the record.
async fn wait_for_dns(reporter: &impl ProgressReporter, grace: Duration) {
    if grace.is_zero() {
        return;
    }
    reporter.step(&format!(
        "waiting {}s for DNS caches to expire the old address",
        grace.as_secs()
    ));
    tokio::time::sleep(grace).await;
}
