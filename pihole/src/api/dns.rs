//! Custom DNS (local "A"/"AAAA") record API

use super::common::{ApiQueryParams, ListResponse, RecordList};
use serde::{Deserialize, Serialize};

/// A custom DNS record as stored by Pi-hole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub domain: String,
    pub ip: String,
}

impl DnsRecord {
    pub fn new(domain: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ip: ip.into(),
        }
    }

    /// Error for a replace that already removed `self`
    pub(crate) fn into_partial_update(self, source: super::ApiError) -> super::ApiError {
        tracing::error!(
            "Removed custom DNS record {} -> {} but could not add its replacement: {}",
            self.domain,
            self.ip,
            source
        );
        super::ApiError::PartialUpdate {
            domain: self.domain,
            ip: self.ip,
            source: Box::new(source),
        }
    }

    fn params(&self, action: &str) -> ApiQueryParams {
        ApiQueryParams::for_list(RecordList::CustomDns, action)
            .add("domain", &self.domain)
            .add("ip", &self.ip)
    }
}

impl super::Client {
    /// GET api.php?customdns&action=add
    pub async fn add_custom_dns(&self, record: &DnsRecord) -> Result<(), super::ApiError> {
        tracing::debug!("Adding custom DNS record {} -> {}", record.domain, record.ip);
        self.mutate(&record.params("add")).await
    }

    /// GET api.php?customdns&action=get, filtered to `domain`
    pub async fn get_custom_dns(&self, domain: &str) -> Result<DnsRecord, super::ApiError> {
        let list: ListResponse = self
            .query(&ApiQueryParams::for_list(RecordList::CustomDns, "get"))
            .await?;

        list.find(domain)
            .map(|(domain, ip)| DnsRecord { domain, ip })
            .ok_or_else(|| super::ApiError::NotFound(domain.to_string()))
    }

    /// Replace the record stored under `old_domain` with `record`.
    ///
    /// The v5 API has no update action, so this looks up the old pair,
    /// deletes it and adds the new one.
    pub async fn update_custom_dns(
        &self,
        old_domain: &str,
        record: &DnsRecord,
    ) -> Result<(), super::ApiError> {
        let existing = self.get_custom_dns(old_domain).await?;
        tracing::debug!(
            "Replacing custom DNS record {} -> {} with {} -> {}",
            existing.domain,
            existing.ip,
            record.domain,
            record.ip
        );

        self.delete_custom_dns(&existing).await?;
        self.add_custom_dns(record)
            .await
            .map_err(|e| existing.into_partial_update(e))
    }

    /// GET api.php?customdns&action=delete
    pub async fn delete_custom_dns(&self, record: &DnsRecord) -> Result<(), super::ApiError> {
        tracing::debug!(
            "Deleting custom DNS record {} -> {}",
            record.domain,
            record.ip
        );
        self.mutate(&record.params("delete")).await
    }
}
