use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Pi-hole rejected the request: {message}")]
    Rejected { message: String },

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed, check the API token")]
    AuthError,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable")]
    ServiceUnavailable,

    /// A replace removed `domain -> ip` but could not add the new record
    #[error("removed {domain} -> {ip} but adding the replacement failed: {source}")]
    PartialUpdate {
        domain: String,
        ip: String,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
