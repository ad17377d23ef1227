//! Test helpers for the Pi-hole API

use super::{Client, RetryConfig};

pub const TEST_TOKEN: &str = "test-token";

pub fn create_test_client(url: &str) -> Client {
    Client::with_config(
        url,
        TEST_TOKEN,
        RetryConfig {
            max_retries: 1,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            timeout_seconds: 5,
        },
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 5000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_api_error_formatting() {
        let error = ApiError::Status {
            status: 400,
            message: "Bad Request".to_string(),
        };
        let error_str = error.to_string();
        assert!(error_str.contains("HTTP 400"));
        assert!(error_str.contains("Bad Request"));

        let error = ApiError::Rejected {
            message: "Invalid IP".to_string(),
        };
        assert!(error.to_string().contains("Invalid IP"));
    }

    #[test]
    fn test_not_found_predicate() {
        assert!(ApiError::NotFound("a.example.com".to_string()).is_not_found());
        assert!(!ApiError::AuthError.is_not_found());
    }

    #[test]
    fn test_record_list_names() {
        assert_eq!(RecordList::CustomDns.as_str(), "customdns");
        assert_eq!(RecordList::CustomCname.as_str(), "customcname");
    }
}
