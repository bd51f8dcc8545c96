//! Instance value types shared across layers.

use std::fmt;

/// Lifecycle state of a compute instance, as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Pending,
    Running,
    Terminated,
    /// Any state the workflow does not act on (stopped, shutting-down, ...).
    Other,
}

impl InstanceState {
    /// Running, or on its way there.
    #[must_use]
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Terminated => "terminated",
            Self::Other => "other",
        })
    }
}

/// A provider-managed virtual machine, as last observed.
///
/// Never persisted between invocations - state is always re-queried.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Provider identifier, e.g. `i-0abc123`.
    pub id: String,
    /// Lifecycle state at observation time.
    pub state: InstanceState,
    /// Value of the `Name` tag, when present.
    pub name_tag: Option<String>,
    /// Private IPv4 address, present once running.
    pub private_ip: Option<String>,
}

/// Parameters for one batch launch request. Struct-based to avoid breaking
/// test stubs on future parameter additions.
pub struct LaunchTemplate<'a> {
    /// Machine image to launch, e.g. `"ami-0e2c8caa4b6378d8c"`.
    pub image_id: &'a str,
    /// Instance type, e.g. `"m5.large"`.
    pub instance_type: &'a str,
    /// Optional availability zone pin.
    pub availability_zone: Option<&'a str>,
    /// Key pair for operator SSH access.
    pub key_name: &'a str,
    /// Security group names applied at launch.
    pub security_groups: &'a [&'a str],
    /// IAM instance profile ARN attached to the instance.
    pub instance_profile_arn: &'a str,
    /// Boot-time initialization script contents.
    pub user_data: &'a str,
    /// `Name` tag applied to instances that reach `running`.
    pub success_tag: &'a str,
    /// `Name` tag applied to instances that fail to start.
    pub failure_tag: &'a str,
}
