//! Staging app server fleet control: start-and-attach, drain-and-terminate.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{ComputeProvider, LoadBalancer, ProgressReporter};
use crate::application::services::database::KEY_NAME;
use crate::application::services::launcher;
use crate::domain::{LaunchTemplate, PollSettings, StagingConfig};

/// `Name` tag identifying staging app server instances.
pub const APP_NAME_TAG: &str = "Staging App Server";
/// `Name` tag applied when an app server fails to start.
const APP_DEAD_TAG: &str = "Dead--Staging App Server";

const APP_IMAGE: &str = "ami-053b0d53c279acc90";
const APP_INSTANCE_TYPE: &str = "c5.xlarge";
const APP_SECURITY_GROUPS: &[&str] = &["staging-app"];
const APP_INSTANCE_PROFILE: &str = "arn:aws:iam::123456789012:instance-profile/StagingAppServer";

/// Inputs for the app server workflow.
pub struct AppServerOptions<'a> {
    /// Boot script passed to new instances.
    pub user_data: &'a Path,
    /// Load balancer the fleet attaches to.
    pub load_balancer: &'a str,
    /// Launch polling parameters.
    pub poll: PollSettings,
}

impl<'a> AppServerOptions<'a> {
    #[must_use]
    pub fn from_config(config: &'a StagingConfig) -> Self {
        Self {
            user_data: &config.app_user_data,
            load_balancer: &config.load_balancer,
            poll: config.poll(),
        }
    }
}

/// Start `count` app servers and attach the ones that came up to the staging
/// load balancer. Returns the number started.
///
/// Registration is one batch call; per-instance registration failures are
/// not tracked.
///
/// # Errors
///
/// Returns an error if the user-data read, the launch, or the registration
/// call fails.
pub async fn start(
    compute: &impl ComputeProvider,
    balancer: &impl LoadBalancer,
    reporter: &impl ProgressReporter,
    count: u32,
    opts: &AppServerOptions<'_>,
) -> Result<usize> {
    let user_data = std::fs::read_to_string(opts.user_data).with_context(|| {
        format!(
            "reading app server user-data script {}",
            opts.user_data.display()
        )
    })?;
    let template = LaunchTemplate {
        image_id: APP_IMAGE,
        instance_type: APP_INSTANCE_TYPE,
        availability_zone: None,
        key_name: KEY_NAME,
        security_groups: APP_SECURITY_GROUPS,
        instance_profile_arn: APP_INSTANCE_PROFILE,
        user_data: &user_data,
        success_tag: APP_NAME_TAG,
        failure_tag: APP_DEAD_TAG,
    };

    let started = launcher::launch(compute, reporter, &template, count, opts.poll).await?;
    if !started.is_empty() {
        balancer
            .register(opts.load_balancer, &started)
            .await
            .with_context(|| {
                format!(
                    "registering instances with load balancer '{}'",
                    opts.load_balancer
                )
            })?;
    }
    Ok(started.len())
}

/// Drain the staging load balancer and terminate its app server instances.
///
/// Every member is deregistered; only members whose `Name` tag equals
/// [`APP_NAME_TAG`] are terminated. Differently tagged members are left
/// running. Returns the number terminated.
///
/// # Errors
///
/// Returns an error if any membership, describe, or terminate call fails.
pub async fn stop_all(
    compute: &impl ComputeProvider,
    balancer: &impl LoadBalancer,
    reporter: &impl ProgressReporter,
    load_balancer: &str,
) -> Result<usize> {
    let members = balancer
        .members(load_balancer)
        .await
        .with_context(|| format!("listing members of load balancer '{load_balancer}'"))?;
    if members.is_empty() {
        reporter.success("load balancer has no members");
        return Ok(0);
    }

    balancer
        .deregister(load_balancer, &members)
        .await
        .with_context(|| {
            format!("deregistering instances from load balancer '{load_balancer}'")
        })?;

    let instances = compute
        .describe_instances(&members)
        .await
        .context("describing load balancer members")?;
    let mut terminated = 0;
    for instance in instances {
        if instance.name_tag.as_deref() == Some(APP_NAME_TAG) {
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::io::Write as _;

    use anyhow::Result;

    use super::{APP_NAME_TAG, AppServerOptions, start, stop_all};
    use crate::application::ports::{ComputeProvider, LoadBalancer};
    use crate::application::services::test_support::{
        ReporterStub, fast_poll, impl_compute_stubs, instance, named_instance,
    };
    use crate::domain::{Instance, InstanceState, LaunchTemplate};

    struct FleetCompute {
        launch_result: Vec<Instance>,
        polls: RefCell<HashMap<String, VecDeque<InstanceState>>>,
        members: Vec<Instance>,
        tags: RefCell<Vec<(String, String)>>,
        terminated: RefCell<Vec<String>>,
    }

    impl FleetCompute {
        fn new() -> Self {
            Self {
                launch_result: Vec::new(),
                polls: RefCell::new(HashMap::new()),
                members: Vec::new(),
                tags: RefCell::new(Vec::new()),
                terminated: RefCell::new(Vec::new()),
            }
        }
    }

    impl ComputeProvider for FleetCompute {
        async fn run_instances(&self, _: &LaunchTemplate<'_>, _: u32) -> Result<Vec<Instance>> {
            Ok(self.launch_result.clone())
        }
        async fn instance_state(&self, id: &str) -> Result<InstanceState> {
            self.polls
                .borrow_mut()
                .get_mut(id)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| anyhow::anyhow!("poll script exhausted for {id}"))
        }
        async fn describe_instances(&self, _: &[String]) -> Result<Vec<Instance>> {
            Ok(self.members.clone())
        }
        async fn tag_name(&self, id: &str, name: &str) -> Result<()> {
            self.tags.borrow_mut().push((id.to_owned(), name.to_owned()));
            Ok(())
        }
        async fn terminate(&self, id: &str) -> Result<()> {
            self.terminated.borrow_mut().push(id.to_owned());
            Ok(())
        }
        impl_compute_stubs!(describe_instance, instances_named);
    }

    struct BalancerSpy {
        members: Vec<String>,
        registered: RefCell<Vec<Vec<String>>>,
        deregistered: RefCell<Vec<Vec<String>>>,
    }

    impl BalancerSpy {
        fn new(members: Vec<String>) -> Self {
            Self {
                members,
                registered: RefCell::new(Vec::new()),
                deregistered: RefCell::new(Vec::new()),
            }
        }
    }

    impl LoadBalancer for BalancerSpy {
        async fn members(&self, _: &str) -> Result<Vec<String>> {
            Ok(self.members.clone())
        }
        async fn register(&self, _: &str, ids: &[String]) -> Result<()> {
            self.registered.borrow_mut().push(ids.to_vec());
            Ok(())
        }
        async fn deregister(&self, _: &str, ids: &[String]) -> Result<()> {
            self.deregistered.borrow_mut().push(ids.to_vec());
            Ok(())
        }
    }

    fn user_data_script() -> tempfile::NamedTempFile {
        let mut script = tempfile::NamedTempFile::new().expect("temp script");
        script.write_all(b"#!/bin/sh\n").expect("write script");
        script
    }

    fn opts(script: &tempfile::NamedTempFile) -> AppServerOptions<'_> {
        AppServerOptions {
            user_data: script.path(),
            load_balancer: "staging",
            poll: fast_poll(),
        }
    }

    #[tokio::test]
    async fn start_registers_started_instances() {
        let mut compute = FleetCompute::new();
        compute.launch_result = vec![
            instance("i-1", InstanceState::Running),
            instance("i-2", InstanceState::Running),
        ];
        let balancer = BalancerSpy::new(Vec::new());
        let script = user_data_script();

        let count = start(&compute, &balancer, &ReporterStub, 2, &opts(&script))
            .await
            .expect("start");

        assert_eq!(count, 2);
        assert_eq!(
            *balancer.registered.borrow(),
            vec![vec!["i-1".to_owned(), "i-2".to_owned()]]
        );
    }

    #[tokio::test]
    async fn start_skips_registration_when_nothing_started() {
        let mut compute = FleetCompute::new();
        compute.launch_result = vec![instance("i-1", InstanceState::Pending)];
        compute.polls = RefCell::new(HashMap::from([(
            "i-1".to_owned(),
            VecDeque::from([InstanceState::Terminated]),
        )]));
        let balancer = BalancerSpy::new(Vec::new());
        let script = user_data_script();

        let count = start(&compute, &balancer, &ReporterStub, 1, &opts(&script))
            .await
            .expect("start");

        assert_eq!(count, 0);
        assert!(balancer.registered.borrow().is_empty());
    }

    #[tokio::test]
    async fn stop_all_terminates_only_app_tagged_members() {
        let mut compute = FleetCompute::new();
        compute.members = vec![
            named_instance("i-1", InstanceState::Running, APP_NAME_TAG),
            named_instance("i-2", InstanceState::Running, "Bastion"),
        ];
        let balancer = BalancerSpy::new(vec!["i-1".to_owned(), "i-2".to_owned()]);

        let count = stop_all(&compute, &balancer, &ReporterStub, "staging")
            .await
            .expect("stop_all");

        assert_eq!(count, 1);
        assert_eq!(
            *balancer.deregistered.borrow(),
            vec![vec!["i-1".to_owned(), "i-2".to_owned()]],
            "every member is deregistered"
        );
        assert_eq!(*compute.terminated.borrow(), ["i-1"]);
    }

    #[tokio::test]
    async fn stop_all_with_empty_membership_does_nothing() {
        let compute = FleetCompute::new();
        let balancer = BalancerSpy::new(Vec::new());

        let count = stop_all(&compute, &balancer, &ReporterStub, "staging")
            .await
            .expect("stop_all");

        assert_eq!(count, 0);
        assert!(balancer.deregistered.borrow().is_empty());
    }
}
