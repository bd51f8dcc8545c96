//! Shared stubs and fixtures for service tests.

use std::time::Duration;

use crate::application::ports::ProgressReporter;
use crate::domain::{Instance, InstanceState, LaunchTemplate, PollSettings};

/// Reporter that swallows everything.
pub struct ReporterStub;

impl ProgressReporter for ReporterStub {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

/// Fast polling for tests: no sleep, one second deadline.
#[must_use]
pub fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::ZERO,
        deadline: Duration::from_secs(1),
    }
}

/// Instance fixture without tags or address.
#[must_use]
pub fn instance(id: &str, state: InstanceState) -> Instance {
    Instance {
        id: id.to_owned(),
        state,
        name_tag: None,
        private_ip: None,
    }
}

/// Instance fixture carrying a `Name` tag.
#[must_use]
pub fn named_instance(id: &str, state: InstanceState, name: &str) -> Instance {
    Instance {
        name_tag: Some(name.to_owned()),
        ..instance(id, state)
    }
}

/// App-server shaped launch template over inline user data.
#[must_use]
pub fn template() -> LaunchTemplate<'static> {
    LaunchTemplate {
        image_id: "ami-test",
        instance_type: "t3.micro",
        availability_zone: None,
        key_name: "test-key",
        security_groups: &["test-group"],
        instance_profile_arn: "arn:aws:iam::123456789012:instance-profile/Test",
        user_data: "#!/bin/sh\n",
        success_tag: "Staging App Server",
        failure_tag: "Dead--Staging App Server",
    }
}

/// Generate `ComputeProvider` stub methods that bail with "not expected".
///
/// Usage: `impl_compute_stubs!(describe_instance, terminate);`
/// Omit any method you implement yourself.
macro_rules! impl_compute_stubs {
    ($($method:ident),* $(,)?) => {
        $(impl_compute_stubs!(@one $method);)*
    };
    (@one run_instances) => {
        async fn run_instances(
            &self,
            _: &$crate::domain::LaunchTemplate<'_>,
            _: u32,
        ) -> anyhow::Result<Vec<$crate::domain::Instance>> {
            anyhow::bail!("not expected")
        }
    };
    (@one instance_state) => {
        async fn instance_state(&self, _: &str) -> anyhow::Result<$crate::domain::InstanceState> {
            anyhow::bail!("not expected")
        }
    };
    (@one describe_instance) => {
        async fn describe_instance(&self, _: &str) -> anyhow::Result<$crate::domain::Instance> {
            anyhow::bail!("not expected")
        }
    };
    (@one instances_named) => {
        async fn instances_named(
            &self,
            _: &str,
        ) -> anyhow::Result<Vec<$crate::domain::Instance>> {
            anyhow::bail!("not expected")
        }
    };
    (@one describe_instances) => {
        async fn describe_instances(
            &self,
            _: &[String],
        ) -> anyhow::Result<Vec<$crate::domain::Instance>> {
            anyhow::bail!("not expected")
        }
    };
    (@one tag_name) => {
        async fn tag_name(&self, _: &str, _: &str) -> anyhow::Result<()> {
            anyhow::bail!("not expected")
        }
    };
    (@one terminate) => {
        async fn terminate(&self, _: &str) -> anyhow::Result<()> {
            anyhow::bail!("not expected")
        }
    };
}
pub(crate) use impl_compute_stubs;
