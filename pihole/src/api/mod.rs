pub mod client;
pub mod cname;
pub mod common;
pub mod dns;
pub mod error;
pub mod memory;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, RetryConfig};
pub use cname::CnameRecord;
pub use common::{ApiQueryParams, ListResponse, MutationResponse, RecordList};
pub use dns::DnsRecord;
pub use error::ApiError;
pub use memory::{ApiCall, MemoryPihole};

use async_trait::async_trait;

/// Operations the reconcilers need from a Pi-hole server.
///
/// `get_*` report an absent record as [`ApiError::NotFound`]. Every other
/// method returns once the server has answered; nothing is retried above
/// this boundary.
#[async_trait]
pub trait PiholeApi: Send + Sync {
    async fn add_custom_dns(&self, record: &DnsRecord) -> Result<(), ApiError>;

    async fn get_custom_dns(&self, domain: &str) -> Result<DnsRecord, ApiError>;

    async fn update_custom_dns(&self, old_domain: &str, record: &DnsRecord)
        -> Result<(), ApiError>;

    async fn delete_custom_dns(&self, record: &DnsRecord) -> Result<(), ApiError>;

    async fn add_custom_cname(&self, record: &CnameRecord) -> Result<(), ApiError>;

    async fn get_custom_cname(&self, domain: &str) -> Result<CnameRecord, ApiError>;

    async fn delete_custom_cname(&self, record: &CnameRecord) -> Result<(), ApiError>;
}

#[async_trait]
impl PiholeApi for Client {
    async fn add_custom_dns(&self, record: &DnsRecord) -> Result<(), ApiError> {
        Client::add_custom_dns(self, record).await
    }

    async fn get_custom_dns(&self, domain: &str) -> Result<DnsRecord, ApiError> {
        Client::get_custom_dns(self, domain).await
    }

    async fn update_custom_dns(
        &self,
        old_domain: &str,
        record: &DnsRecord,
    ) -> Result<(), ApiError> {
        Client::update_custom_dns(self, old_domain, record).await
    }

    async fn delete_custom_dns(&self, record: &DnsRecord) -> Result<(), ApiError> {
        Client::delete_custom_dns(self, record).await
    }

    async fn add_custom_cname(&self, record: &CnameRecord) -> Result<(), ApiError> {
        Client::add_custom_cname(self, record).await
    }

    async fn get_custom_cname(&self, domain: &str) -> Result<CnameRecord, ApiError> {
        Client::get_custom_cname(self, domain).await
    }

    async fn delete_custom_cname(&self, record: &CnameRecord) -> Result<(), ApiError> {
        Client::delete_custom_cname(self, record).await
    }
}
