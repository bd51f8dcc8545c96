//! EC2 adapter - implements `ComputeProvider` over the AWS SDK client.

use anyhow::{Context, Result, anyhow};
use aws_sdk_ec2::types::{
    Filter, IamInstanceProfileSpecification, InstanceStateName, InstanceType, Placement, Tag,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::application::ports::ComputeProvider;
use crate::domain::{Instance, InstanceState, LaunchTemplate};

/// Compute adapter backed by the EC2 control plane.
pub struct Ec2Compute {
    client: aws_sdk_ec2::Client,
}

impl Ec2Compute {
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(config),
        }
    }

    async fn describe_one(&self, id: &str) -> Result<Instance> {
        let output = self
            .client
            .describe_instances()
            .instance_ids(id)
            .send()
            .await
            .context("EC2 DescribeInstances")?;
        output
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .map(map_instance)
            .next()
            .ok_or_else(|| anyhow!("instance {id} not found"))
    }
}

impl ComputeProvider for Ec2Compute {
    async fn run_instances(
        &self,
        template: &LaunchTemplate<'_>,
        count: u32,
    ) -> Result<Vec<Instance>> {
        let count = i32::try_from(count).context("instance count out of range")?;
        // EC2 requires user data base64-encoded on the wire.
        let user_data = BASE64.encode(template.user_data);

        let mut request = self
            .client
            .run_instances()
            .image_id(template.image_id)
            .instance_type(InstanceType::from(template.instance_type))
            .key_name(template.key_name)
            .user_data(user_data)
            .iam_instance_profile(
                IamInstanceProfileSpecification::builder()
                    .arn(template.instance_profile_arn)
                    .build(),
            )
            .min_count(count)
            .max_count(count);
        for group in template.security_groups {
            request = request.security_groups(*group);
        }
        if let Some(zone) = template.availability_zone {
            request = request.placement(Placement::builder().availability_zone(zone).build());
        }

        let output = request.send().await.context("EC2 RunInstances")?;
        Ok(output.instances().iter().map(map_instance).collect())
    }

    async fn instance_state(&self, id: &str) -> Result<InstanceState> {
        Ok(self.describe_one(id).await?.state)
    }

    async fn describe_instance(&self, id: &str) -> Result<Instance> {
        self.describe_one(id).await
    }

    async fn instances_named(&self, name_tag: &str) -> Result<Vec<Instance>> {
        let output = self
            .client
            .describe_instances()
            .filters(Filter::builder().name("tag:Name").values(name_tag).build())
            .send()
            .await
            .context("EC2 DescribeInstances by tag")?;
        Ok(output
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .map(map_instance)
            .collect())
    }

    async fn describe_instances(&self, ids: &[String]) -> Result<Vec<Instance>> {
        let output = self
            .client
            .describe_instances()
            .set_instance_ids(Some(ids.to_vec()))
            .send()
            .await
            .context("EC2 DescribeInstances")?;
        Ok(output
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .map(map_instance)
            .collect())
    }

    async fn tag_name(&self, id: &str, name: &str) -> Result<()> {
        self.client
            .create_tags()
            .resources(id)
            .tags(Tag::builder().key("Name").value(name).build())
            .send()
            .await
            .context("EC2 CreateTags")?;
        Ok(())
    }

    async fn terminate(&self, id: &str) -> Result<()> {
        self.client
            .terminate_instances()
            .instance_ids(id)
            .send()
            .await
            .context("EC2 TerminateInstances")?;
        Ok(())
    }
}

fn map_state(name: Option<&InstanceStateName>) -> InstanceState {
    match name {
        Some(InstanceStateName::Pending) => InstanceState::Pending,
        Some(InstanceStateName::Running) => InstanceState::Running,
        Some(InstanceStateName::Terminated) => InstanceState::Terminated,
        _ => InstanceState::Other,
    }
}

fn map_instance(raw: &aws_sdk_ec2::types::Instance) -> Instance {
    let name_tag = raw
        .tags()
        .iter()
        .find(|tag| tag.key() == Some("Name"))
        .and_then(|tag| tag.value())
        .map(str::to_owned);
    Instance {
        id: raw.instance_id().unwrap_or_default().to_owned(),
        state: map_state(raw.state().and_then(|s| s.name())),
        name_tag,
        private_ip: raw.private_ip_address().map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_ec2::types::{
        Instance as AwsInstance, InstanceState as AwsInstanceState, InstanceStateName, Tag,
    };

    use super::{map_instance, map_state};
    use crate::domain::InstanceState;

    #[test]
    fn maps_lifecycle_states() {
        assert_eq!(
            map_state(Some(&InstanceStateName::Pending)),
            InstanceState::Pending
        );
        assert_eq!(
            map_state(Some(&InstanceStateName::Running)),
            InstanceState::Running
        );
        assert_eq!(
            map_state(Some(&InstanceStateName::Terminated)),
            InstanceState::Terminated
        );
        assert_eq!(
            map_state(Some(&InstanceStateName::Stopped)),
            InstanceState::Other
        );
        assert_eq!(map_state(None), InstanceState::Other);
    }

    #[test]
    fn maps_instance_fields() {
        let raw = AwsInstance::builder()
            .instance_id("i-0123")
            .state(
                AwsInstanceState::builder()
                    .name(InstanceStateName::Running)
                    .build(),
            )
            .tags(Tag::builder().key("Name").value("Staging App Server").build())
            .private_ip_address("10.0.0.5")
            .build();

        let mapped = map_instance(&raw);

        assert_eq!(mapped.id, "i-0123");
        assert_eq!(mapped.state, InstanceState::Running);
        assert_eq!(mapped.name_tag.as_deref(), Some("Staging App Server"));
        assert_eq!(mapped.private_ip.as_deref(), Some("10.0.0.5"));
    }
}
