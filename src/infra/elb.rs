//! Classic ELB adapter - implements `LoadBalancer` over the AWS SDK client.

use anyhow::{Context, Result, anyhow};
use aws_sdk_elasticloadbalancing::types::Instance as ElbInstance;

use crate::application::ports::LoadBalancer;

/// Membership adapter backed by the classic Elastic Load Balancing API.
pub struct ClassicElb {
    client: aws_sdk_elasticloadbalancing::Client,
}

impl ClassicElb {
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_elasticloadbalancing::Client::new(config),
        }
    }
}

impl LoadBalancer for ClassicElb {
    async fn members(&self, name: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .describe_load_balancers()
            .load_balancer_names(name)
            .send()
            .await
            .context("ELB DescribeLoadBalancers")?;
        let description = output
            .load_balancer_descriptions()
            .first()
            .ok_or_else(|| anyhow!("load balancer '{name}' not found"))?;
        Ok(description
            .instances()
            .iter()
            .filter_map(|member| member.instance_id())
            .map(str::to_owned)
            .collect())
    }

    async fn register(&self, name: &str, ids: &[String]) -> Result<()> {
        self.client
            .register_instances_with_load_balancer()
            .load_balancer_name(name)
            .set_instances(Some(member_list(ids)))
            .send()
            .await
            .context("ELB RegisterInstancesWithLoadBalancer")?;
        Ok(())
    }

    async fn deregister(&self, name: &str, ids: &[String]) -> Result<()> {
        self.client
            .deregister_instances_from_load_balancer()
            .load_balancer_name(name)
            .set_instances(Some(member_list(ids)))
            .send()
            .await
            .context("ELB DeregisterInstancesFromLoadBalancer")?;
        Ok(())
    }
}

fn member_list(ids: &[String]) -> Vec<ElbInstance> {
    ids.iter()
        .map(|id| ElbInstance::builder().instance_id(id).build())
        .collect()
}
