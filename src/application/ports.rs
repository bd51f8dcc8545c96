//! Port trait definitions for the application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` - never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;

use anyhow::Result;

use crate::domain::{Instance, InstanceState, LaunchTemplate};

/// Callback invoked with `(bytes_done, bytes_total)` as an upload advances.
pub type UploadProgress<'a> = &'a mut dyn FnMut(u64, u64);

/// Compute control plane: launch, inspect, tag, and terminate instances.
#[allow(async_fn_in_trait)]
pub trait ComputeProvider {
    /// Issue one batch launch request for `count` instances.
    async fn run_instances(
        &self,
        template: &LaunchTemplate<'_>,
        count: u32,
    ) -> Result<Vec<Instance>>;

    /// Current lifecycle state of a single instance.
    async fn instance_state(&self, id: &str) -> Result<InstanceState>;

    /// Re-describe a single instance (state, tags, address).
    async fn describe_instance(&self, id: &str) -> Result<Instance>;

    /// All instances whose `Name` tag equals `name_tag`.
    async fn instances_named(&self, name_tag: &str) -> Result<Vec<Instance>>;

    /// Describe each instance in `ids`.
    async fn describe_instances(&self, ids: &[String]) -> Result<Vec<Instance>>;

    /// Set the `Name` tag on an instance.
    async fn tag_name(&self, id: &str, name: &str) -> Result<()>;

    /// Terminate an instance.
    async fn terminate(&self, id: &str) -> Result<()>;
}

/// Load balancer membership management.
#[allow(async_fn_in_trait)]
pub trait LoadBalancer {
    /// Instance ids currently attached to the named load balancer.
    async fn members(&self, name: &str) -> Result<Vec<String>>;

    /// Attach instances to the named load balancer.
    async fn register(&self, name: &str, ids: &[String]) -> Result<()>;

    /// Detach instances from the named load balancer.
    async fn deregister(&self, name: &str, ids: &[String]) -> Result<()>;
}

/// Object storage upload with progress reporting.
#[allow(async_fn_in_trait)]
pub trait ArtifactStore {
    /// Stream the file at `path` to `bucket`/`key`, invoking `on_progress`
    /// periodically with `(bytes_done, bytes_total)`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        on_progress: UploadProgress<'_>,
    ) -> Result<()>;
}

/// DNS record management for the staging database hostname.
#[allow(async_fn_in_trait)]
pub trait DnsProvider {
    /// Point the A-record `record` in `zone` at `address`.
    ///
    /// The record must already exist; its TTL is preserved.
    async fn update_a_record(&self, zone: &str, record: &str, address: &str) -> Result<()>;
}

/// Progress reporting port so services can emit events without depending on
/// the presentation layer. Sync trait - no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
