pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider_data;
pub mod reconcile;
pub mod resources;
pub mod schema;
pub mod types;

pub use config::{ConfigValue, ProviderConfig};
pub use error::ProviderError;
pub use logging::init_logging;
pub use provider_data::PiholeProviderData;

use crate::resources::{CnameResource, DnsRecordResource, Resource};
use crate::schema::{AttributeBuilder, Schema, SchemaBuilder};
use crate::types::Diagnostic;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

pub struct ConfigureResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PiholeProvider {
    version: String,
    provider_data: Option<PiholeProviderData>,
}

impl PiholeProvider {
    pub const TYPE_NAME: &'static str = "pihole";

    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            provider_data: None,
        }
    }

    /// Provider already wired to `client`, skipping `configure`
    pub fn with_client(version: impl Into<String>, client: Arc<dyn api::PiholeApi>) -> Self {
        Self {
            version: version.into(),
            provider_data: Some(PiholeProviderData::from_arc(client)),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn schema() -> Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();

        SCHEMA
            .get_or_init(|| {
                SchemaBuilder::new()
                    .version(0)
                    .description("Interact with a Pi-hole server")
                    .attribute(
                        AttributeBuilder::new("url")
                            .description(
                                "URL of the Pi-hole admin interface. May also be provided via the PIHOLE_API_URL environment variable.",
                            )
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("token")
                            .description(
                                "API token for the Pi-hole server. May also be provided via the PIHOLE_TOKEN environment variable.",
                            )
                            .optional()
                            .sensitive()
                            .build(),
                    )
                    .build()
            })
            .clone()
    }

    pub fn configure(&mut self, request: ProviderConfig) -> ConfigureResponse {
        let resolved = match config::resolve(&request) {
            Ok(resolved) => resolved,
            Err(errors) => {
                return ConfigureResponse {
                    diagnostics: errors.iter().map(|e| e.to_diagnostic()).collect(),
                }
            }
        };

        match api::Client::new(&resolved.url, &resolved.token) {
            Ok(client) => {
                tracing::info!(endpoint = %client.endpoint(), "Configured Pi-hole client");
                self.provider_data = Some(PiholeProviderData::new(client));
                ConfigureResponse {
                    diagnostics: vec![],
                }
            }
            Err(e) => ConfigureResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to create API client",
                    ProviderError::from(e).to_string(),
                )],
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider_data.is_some()
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        vec![resources::dns_record::TYPE_NAME, resources::cname::TYPE_NAME]
    }

    pub fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>, ProviderError> {
        let provider_data = self
            .provider_data
            .as_ref()
            .ok_or(ProviderError::NotConfigured)?;

        match name {
            resources::dns_record::TYPE_NAME => Ok(Box::new(DnsRecordResource::new(provider_data))),
            resources::cname::TYPE_NAME => Ok(Box::new(CnameResource::new(provider_data))),
            _ => Err(ProviderError::UnknownResource(name.to_string())),
        }
    }

    pub fn resource_schemas(&self) -> HashMap<String, Schema> {
        static SCHEMAS: OnceLock<HashMap<String, Schema>> = OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    resources::dns_record::TYPE_NAME.to_string(),
                    DnsRecordResource::schema_static(),
                );
                schemas.insert(
                    resources::cname::TYPE_NAME.to_string(),
                    CnameResource::schema_static(),
                );
                schemas
            })
            .clone()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::MemoryPihole;
    use crate::config::{TOKEN_ENV, URL_ENV};
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        std::env::set_var(URL_ENV, "http://pi.hole");
        std::env::set_var(TOKEN_ENV, "secret");

        let mut provider = PiholeProvider::new("test");
        let response = provider.configure(ProviderConfig::default());

        assert!(response.diagnostics.is_empty());
        assert!(provider.is_configured());

        std::env::remove_var(URL_ENV);
        std::env::remove_var(TOKEN_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_url() {
        std::env::remove_var(URL_ENV);
        std::env::set_var(TOKEN_ENV, "secret");

        let mut provider = PiholeProvider::new("test");
        let response = provider.configure(ProviderConfig::default());

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].attribute.as_deref(), Some("url"));
        assert!(response.diagnostics[0].detail.contains("PIHOLE_API_URL"));
        assert!(!provider.is_configured());

        std::env::remove_var(TOKEN_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_token() {
        std::env::set_var(URL_ENV, "http://pi.hole");
        std::env::remove_var(TOKEN_ENV);

        let mut provider = PiholeProvider::new("test");
        let response = provider.configure(ProviderConfig::default());

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].attribute.as_deref(), Some("token"));
        assert!(!provider.is_configured());

        std::env::remove_var(URL_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn explicit_config_needs_no_environment() {
        std::env::remove_var(URL_ENV);
        std::env::remove_var(TOKEN_ENV);

        let mut provider = PiholeProvider::new("test");
        let response = provider.configure(ProviderConfig::new("https://pihole.lan", "secret"));

        assert!(response.diagnostics.is_empty());
        assert!(provider.is_configured());
    }

    #[test]
    fn provider_creates_resources_after_configuration() {
        let provider = PiholeProvider::with_client("test", Arc::new(MemoryPihole::new()));

        let dns = provider.create_resource("pihole_dnsrecord").unwrap();
        assert_eq!(dns.type_name(), "pihole_dnsrecord");
        let cname = provider.create_resource("pihole_cname").unwrap();
        assert_eq!(cname.type_name(), "pihole_cname");

        let unknown = provider.create_resource("pihole_group");
        assert!(matches!(unknown, Err(ProviderError::UnknownResource(_))));
    }

    #[test]
    fn provider_fails_to_create_resources_before_configuration() {
        let provider = PiholeProvider::new("test");

        let resource = provider.create_resource("pihole_dnsrecord");
        assert!(resource
            .err()
            .unwrap()
            .to_string()
            .contains("Provider not configured"));
    }

    #[test]
    fn provider_schemas_are_cached_and_immutable() {
        let provider = PiholeProvider::new("test");

        let schemas1 = provider.resource_schemas();
        let schemas2 = provider.resource_schemas();

        assert_eq!(schemas1, schemas2);
        assert_eq!(schemas1.len(), provider.resource_types().len());
    }

    #[test]
    fn provider_schema_hides_token() {
        let schema = PiholeProvider::schema();

        let token = schema.attribute("token").unwrap();
        assert!(token.sensitive && token.optional);
        assert!(schema.attribute("url").unwrap().optional);
    }
}
