use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::common::{ApiQueryParams, MutationResponse};
use super::error::ApiError;

/// Path of the admin API script, appended when the configured URL points at the host
const API_PATH: &str = "/admin/api.php";

/// Pi-hole admin API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    endpoint: String,
    api_token: String,
    retry_config: RetryConfig,
}

/// Retry and timeout tuning. Retries only ever apply to `get` actions.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 100,
            max_backoff_ms: 5000,
            timeout_seconds: 30,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), doubling up to `max_backoff_ms`
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.inner.endpoint)
            .field("api_token", &"<redacted>")
            .field("retry_config", &self.inner.retry_config)
            .finish()
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(url: &str, api_token: &str) -> Result<Self, ApiError> {
        Self::with_config(url, api_token, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        url: &str,
        api_token: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let endpoint = normalize_endpoint(url)?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                endpoint,
                api_token: api_token.to_string(),
                retry_config,
            }),
        })
    }

    /// Fully-qualified `api.php` URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute an idempotent read, retrying transport failures and 5xx responses
    pub async fn query<T: DeserializeOwned>(&self, params: &ApiQueryParams) -> Result<T, ApiError> {
        let retry = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let backoff = retry.backoff_ms(attempt);
                tracing::debug!(
                    "Retrying {} after {}ms (attempt {})",
                    params.to_query_string(),
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let error = match self.send(params).await {
                Ok(response) if response.status().is_success() => {
                    return Self::parse_body(response).await;
                }
                Ok(response) if response.status().is_server_error() => {
                    Self::status_error(response).await
                }
                Ok(response) => return Err(Self::status_error(response).await),
                Err(e) if e.is_timeout() => ApiError::Timeout(retry.timeout_seconds),
                Err(e) if e.is_connect() => ApiError::RequestError(e),
                Err(e) => return Err(ApiError::RequestError(e)),
            };

            if attempt >= retry.max_retries {
                return Err(error);
            }
            attempt += 1;
        }
    }

    /// Execute an `add` or `delete` action exactly once
    pub async fn mutate(&self, params: &ApiQueryParams) -> Result<(), ApiError> {
        let response = self.send(params).await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.inner.retry_config.timeout_seconds)
            } else {
                ApiError::RequestError(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: MutationResponse = Self::parse_body(response).await?;
        if body.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: body.message,
            })
        }
    }

    async fn send(&self, params: &ApiQueryParams) -> Result<reqwest::Response, reqwest::Error> {
        tracing::debug!(
            "GET request to: {}{}",
            self.inner.endpoint,
            params.to_query_string()
        );

        let query = params
            .clone()
            .add("auth", &self.inner.api_token)
            .to_query_string();
        let url = format!("{}{}", self.inner.endpoint, query);

        let response = self.inner.http_client.get(url).send().await?;
        tracing::debug!("Response status: {}", response.status());
        Ok(response)
    }

    async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        // Pi-hole answers requests with a bad token with an empty JSON array
        if text.trim() == "[]" {
            return Err(ApiError::AuthError);
        }

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    async fn status_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        match status {
            401 | 403 => ApiError::AuthError,
            429 => ApiError::RateLimited,
            503 => ApiError::ServiceUnavailable,
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::error!("API error response ({}): {}", status, message);
                ApiError::Status { status, message }
            }
        }
    }
}

/// Turn a configured server URL into the `api.php` endpoint.
///
/// `http://pi.hole` becomes `http://pi.hole/admin/api.php`; a URL that already
/// names a `.php` script is kept as is. Query and fragment are dropped.
pub fn normalize_endpoint(raw: &str) -> Result<String, ApiError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            raw,
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ApiError::InvalidUrl(format!("{}: missing host", raw)));
    }

    url.set_query(None);
    url.set_fragment(None);

    let path = url.path().trim_end_matches('/').to_string();
    if !path.ends_with(".php") {
        url.set_path(&format!("{}{}", path, API_PATH));
    }

    Ok(url.to_string())
}
