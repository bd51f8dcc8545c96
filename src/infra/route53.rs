//! Route 53 adapter - implements `DnsProvider` with TTL-preserving upserts.

use anyhow::{Context, Result, anyhow};
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};

use crate::application::ports::DnsProvider;
use crate::domain::ProvisionError;

/// Fallback TTL when the existing record carries none.
const DEFAULT_TTL: i64 = 60;

/// DNS adapter backed by Route 53.
pub struct Route53Dns {
    client: aws_sdk_route53::Client,
}

impl Route53Dns {
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_route53::Client::new(config),
        }
    }

    async fn zone_id(&self, zone: &str) -> Result<String> {
        let output = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(zone)
            .send()
            .await
            .context("Route53 ListHostedZonesByName")?;
        let hosted = output
            .hosted_zones()
            .iter()
            .find(|candidate| trim_root(candidate.name()) == trim_root(zone))
            .ok_or_else(|| anyhow!("hosted zone '{zone}' not found"))?;
        Ok(hosted.id().to_owned())
    }

    /// TTL of the existing A-record, confirming the record is present before
    /// any change is submitted.
    async fn existing_ttl(&self, zone_id: &str, zone: &str, record: &str) -> Result<i64> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(record)
            .start_record_type(RrType::A)
            .max_items(1)
            .send()
            .await
            .context("Route53 ListResourceRecordSets")?;
        let set = output
            .resource_record_sets()
            .iter()
            .find(|set| trim_root(set.name()) == trim_root(record) && *set.r#type() == RrType::A)
            .ok_or_else(|| ProvisionError::RecordNotFound {
                record: record.to_owned(),
                zone: zone.to_owned(),
            })?;
        Ok(set.ttl().unwrap_or(DEFAULT_TTL))
    }
}

impl DnsProvider for Route53Dns {
    async fn update_a_record(&self, zone: &str, record: &str, address: &str) -> Result<()> {
        let zone_id = self.zone_id(zone).await?;
        let ttl = self.existing_ttl(&zone_id, zone, record).await?;

        let record_set = ResourceRecordSet::builder()
            .name(record)
            .r#type(RrType::A)
            .ttl(ttl)
            .resource_records(
                ResourceRecord::builder()
                    .value(address)
                    .build()
                    .context("building resource record")?,
            )
            .build()
            .context("building record set")?;
        let change = Change::builder()
            .action(ChangeAction::Upsert)
            .resource_record_set(record_set)
            .build()
            .context("building change")?;
        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(
                ChangeBatch::builder()
                    .changes(change)
                    .build()
                    .context("building change batch")?,
            )
            .send()
            .await
            .context("Route53 ChangeResourceRecordSets")?;
        Ok(())
    }
}

/// Route 53 returns fully-qualified names; compare without the trailing dot.
fn trim_root(name: &str) -> &str {
    name.trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use super::trim_root;

    #[test]
    fn trims_the_trailing_dot_only() {
        assert_eq!(trim_root("db.staging.example.com."), "db.staging.example.com");
        assert_eq!(trim_root("db.staging.example.com"), "db.staging.example.com");
        assert_eq!(trim_root(""), "");
    }
}
