//! Resolved configuration for one stagectl invocation.

use std::path::PathBuf;
use std::time::Duration;

/// Instance state polling parameters.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Delay between state polls.
    pub interval: Duration,
    /// Per-instance limit on the time spent waiting to leave `pending`.
    pub deadline: Duration,
}

/// Everything an invocation needs to know about the staging environment.
///
/// Values come from CLI flags with `STAGECTL_*` environment fallbacks; paths
/// default to well-known locations under `$HOME`.
#[derive(Debug, Clone)]
pub struct StagingConfig {
    /// AWS region hosting the staging environment.
    pub region: String,
    /// Local build artifact uploaded by `--upload`.
    pub artifact: PathBuf,
    /// Boot script passed to the database instance.
    pub db_user_data: PathBuf,
    /// Boot script passed to app server instances.
    pub app_user_data: PathBuf,
    /// Bucket receiving the artifact.
    pub bucket: String,
    /// Object key the artifact is stored under.
    pub object_key: String,
    /// Name of the staging load balancer.
    pub load_balancer: String,
    /// Hosted zone containing the database record.
    pub zone: String,
    /// A-record pointed at the database's private address.
    pub record: String,
    /// Delay between instance state polls.
    pub poll_interval: Duration,
    /// Per-instance limit on waiting out the `pending` state.
    pub launch_timeout: Duration,
    /// Wait after a DNS update for caches to expire the old address.
    pub dns_grace: Duration,
}

impl StagingConfig {
    /// Polling parameters for instance launches.
    #[must_use]
    pub fn poll(&self) -> PollSettings {
        PollSettings {
            interval: self.poll_interval,
            deadline: self.launch_timeout,
        }
    }
}
