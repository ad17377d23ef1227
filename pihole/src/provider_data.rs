//! Provider data structure passed to resources

use crate::api::PiholeApi;
use std::sync::Arc;

/// Client handle shared read-only by every resource instance
#[derive(Clone)]
pub struct PiholeProviderData {
    pub client: Arc<dyn PiholeApi>,
}

impl PiholeProviderData {
    pub fn new(client: impl PiholeApi + 'static) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn from_arc(client: Arc<dyn PiholeApi>) -> Self {
        Self { client }
    }
}
