//! Common types and utilities for the Pi-hole admin API

use serde::Deserialize;

/// Custom record list addressed by an `api.php` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordList {
    CustomDns,
    CustomCname,
}

impl RecordList {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordList::CustomDns => "customdns",
            RecordList::CustomCname => "customcname",
        }
    }
}

/// Body returned by `add` and `delete` actions
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Body returned by `get` actions: `{"data": [[domain, value], ...]}`
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub data: Vec<(String, String)>,
}

impl ListResponse {
    /// Find the entry for `domain`. Pi-hole stores domains lowercased, so the
    /// lookup ignores ASCII case and returns the server's spelling.
    pub fn find(self, domain: &str) -> Option<(String, String)> {
        self.data
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(domain))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, Option<String>)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query against one of the custom record lists
    pub fn for_list(list: RecordList, action: &str) -> Self {
        Self::new().flag(list.as_str()).add("action", action)
    }

    /// Bare key without a value, e.g. `customdns`
    pub fn flag<K: Into<String>>(mut self, key: K) -> Self {
        self.params.push((key.into(), None));
        self
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), Some(value.to_string())));
        self
    }

    pub fn action(&self) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == "action")
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| match v {
                        Some(v) => format!("{}={}", k, urlencoding::encode(v)),
                        None => k.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_keeps_bare_flags_and_encodes_values() {
        let params = ApiQueryParams::for_list(RecordList::CustomDns, "add")
            .add("domain", "test.example.com")
            .add("ip", "fe80::1");

        assert_eq!(
            params.to_query_string(),
            "?customdns&action=add&domain=test.example.com&ip=fe80%3A%3A1"
        );
        assert_eq!(params.action(), Some("add"));
    }

    #[test]
    fn empty_params_produce_empty_query() {
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
        assert_eq!(ApiQueryParams::new().action(), None);
    }

    #[test]
    fn list_lookup_ignores_case_and_returns_server_spelling() {
        let list: ListResponse = serde_json::from_str(
            r#"{"data":[["other.example.com","10.0.0.1"],["test.example.com","1.2.3.4"]]}"#,
        )
        .unwrap();

        let found = list.find("TEST.example.com").unwrap();
        assert_eq!(found.0, "test.example.com");
        assert_eq!(found.1, "1.2.3.4");
    }

    #[test]
    fn mutation_response_tolerates_missing_message() {
        let resp: MutationResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.message.is_empty());
    }
}
