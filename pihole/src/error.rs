use crate::api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not configured")]
    NotConfigured,

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Failed to create API client: {0}")]
    Client(#[from] ApiError),
}
