//! Custom CNAME record API

use super::common::{ApiQueryParams, ListResponse, RecordList};
use serde::{Deserialize, Serialize};

/// A custom CNAME record: `domain` is an alias for `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnameRecord {
    pub domain: String,
    pub target: String,
}

impl CnameRecord {
    pub fn new(domain: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            target: target.into(),
        }
    }

    fn params(&self, action: &str) -> ApiQueryParams {
        ApiQueryParams::for_list(RecordList::CustomCname, action)
            .add("domain", &self.domain)
            .add("target", &self.target)
    }
}

impl super::Client {
    /// GET api.php?customcname&action=add
    pub async fn add_custom_cname(&self, record: &CnameRecord) -> Result<(), super::ApiError> {
        tracing::debug!("Adding CNAME {} -> {}", record.domain, record.target);
        self.mutate(&record.params("add")).await
    }

    /// GET api.php?customcname&action=get, filtered to `domain`
    pub async fn get_custom_cname(&self, domain: &str) -> Result<CnameRecord, super::ApiError> {
        let list: ListResponse = self
            .query(&ApiQueryParams::for_list(RecordList::CustomCname, "get"))
            .await?;

        list.find(domain)
            .map(|(domain, target)| CnameRecord { domain, target })
            .ok_or_else(|| super::ApiError::NotFound(domain.to_string()))
    }

    /// GET api.php?customcname&action=delete
    pub async fn delete_custom_cname(&self, record: &CnameRecord) -> Result<(), super::ApiError> {
        tracing::debug!("Deleting CNAME {} -> {}", record.domain, record.target);
        self.mutate(&record.params("delete")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use crate::api::ApiError;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn add_sends_domain_and_target() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/admin/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::Regex("^customcname&".into()),
                Matcher::UrlEncoded("action".into(), "add".into()),
                Matcher::UrlEncoded("domain".into(), "alias.example.com".into()),
                Matcher::UrlEncoded("target".into(), "real.example.com".into()),
            ]))
            .with_body(r#"{"success":true,"message":""}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        client
            .add_custom_cname(&CnameRecord::new("alias.example.com", "real.example.com"))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_reads_from_cname_list() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/admin/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::Regex("^customcname&".into()),
                Matcher::UrlEncoded("action".into(), "get".into()),
            ]))
            .with_body(r#"{"data":[["alias.example.com","real.example.com"]]}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());

        let record = client.get_custom_cname("alias.example.com").await.unwrap();
        assert_eq!(record.target, "real.example.com");

        let missing = client.get_custom_cname("other.example.com").await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_sends_full_pair() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/admin/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::Regex("^customcname&".into()),
                Matcher::UrlEncoded("action".into(), "delete".into()),
                Matcher::UrlEncoded("domain".into(), "alias.example.com".into()),
                Matcher::UrlEncoded("target".into(), "real.example.com".into()),
            ]))
            .with_body(r#"{"success":true,"message":""}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        client
            .delete_custom_cname(&CnameRecord::new("alias.example.com", "real.example.com"))
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
