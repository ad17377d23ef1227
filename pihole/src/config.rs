//! Provider configuration
//!
//! `url` and `token` come from the provider block or, when left null there,
//! from `PIHOLE_API_URL` / `PIHOLE_TOKEN`. Every problem is collected so the
//! practitioner sees all of them in one plan.

use crate::api::client::normalize_endpoint;
use crate::types::{AttributeValue, Diagnostic, ResourceState};
use std::fmt;
use thiserror::Error;

pub const URL_ENV: &str = "PIHOLE_API_URL";
pub const TOKEN_ENV: &str = "PIHOLE_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigValue {
    #[default]
    Null,
    Unknown,
    Known(String),
}

impl From<Option<&AttributeValue>> for ConfigValue {
    fn from(value: Option<&AttributeValue>) -> Self {
        match value {
            None | Some(AttributeValue::Null) => ConfigValue::Null,
            Some(AttributeValue::Unknown) => ConfigValue::Unknown,
            Some(AttributeValue::String(s)) => ConfigValue::Known(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: ConfigValue,
    pub token: ConfigValue,
}

impl ProviderConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: ConfigValue::Known(url.into()),
            token: ConfigValue::Known(token.into()),
        }
    }

    /// Read the provider block as decoded by the host
    pub fn from_state(state: &ResourceState) -> Self {
        Self {
            url: state.get("url").into(),
            token: state.get("token").into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{attribute}' is not known until apply; set it to a literal or use {env}")]
    Unknown {
        attribute: &'static str,
        env: &'static str,
    },

    #[error("'{attribute}' is required (set in provider config or {env} env var)")]
    Missing {
        attribute: &'static str,
        env: &'static str,
    },

    #[error("{0}")]
    InvalidUrl(String),
}

impl ConfigError {
    pub fn attribute(&self) -> &'static str {
        match self {
            ConfigError::Unknown { attribute, .. } | ConfigError::Missing { attribute, .. } => {
                attribute
            }
            ConfigError::InvalidUrl(_) => "url",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            ConfigError::Unknown { .. } => "Unknown provider configuration value",
            ConfigError::Missing { .. } => "Missing provider configuration value",
            ConfigError::InvalidUrl(_) => "Invalid Pi-hole URL",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary(), self.to_string()).with_attribute(self.attribute())
    }
}

/// Fully resolved settings. `url` is the API endpoint, `/admin/api.php` included.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub url: String,
    pub token: String,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Resolve against the process environment
pub fn resolve(config: &ProviderConfig) -> Result<ResolvedConfig, Vec<ConfigError>> {
    resolve_with(config, |name| std::env::var(name).ok())
}

pub fn resolve_with(
    config: &ProviderConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig, Vec<ConfigError>> {
    let mut errors = vec![];

    let url = resolve_value(&config.url, "url", URL_ENV, &lookup)
        .and_then(|raw| {
            normalize_endpoint(&raw).map_err(|e| ConfigError::InvalidUrl(e.to_string()))
        })
        .map_err(|e| errors.push(e))
        .ok();
    let token = resolve_value(&config.token, "token", TOKEN_ENV, &lookup)
        .map_err(|e| errors.push(e))
        .ok();

    match (url, token) {
        (Some(url), Some(token)) => Ok(ResolvedConfig { url, token }),
        _ => Err(errors),
    }
}

fn resolve_value(
    value: &ConfigValue,
    attribute: &'static str,
    env: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let resolved = match value {
        ConfigValue::Unknown => return Err(ConfigError::Unknown { attribute, env }),
        ConfigValue::Known(value) => Some(value.clone()),
        ConfigValue::Null => lookup(env),
    };

    match resolved {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { attribute, env }),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let config = ProviderConfig::new("http://pi.hole", "explicit");
        let resolved = resolve_with(&config, |name| match name {
            URL_ENV => Some("http://other".to_string()),
            TOKEN_ENV => Some("from-env".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(resolved.url, "http://pi.hole/admin/api.php");
        assert_eq!(resolved.token, "explicit");
    }

    #[test]
    fn null_values_fall_back_to_environment() {
        let resolved = resolve_with(&ProviderConfig::default(), |name| match name {
            URL_ENV => Some("https://pihole.lan/admin/api.php".to_string()),
            TOKEN_ENV => Some("from-env".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(resolved.url, "https://pihole.lan/admin/api.php");
        assert_eq!(resolved.token, "from-env");
    }

    #[test]
    fn every_problem_is_reported() {
        let config = ProviderConfig {
            url: ConfigValue::Unknown,
            token: ConfigValue::Known(String::new()),
        };

        let errors = resolve_with(&config, no_env).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ConfigError::Unknown {
                    attribute: "url",
                    env: URL_ENV
                },
                ConfigError::Missing {
                    attribute: "token",
                    env: TOKEN_ENV
                },
            ]
        );
    }

    #[test]
    fn non_http_url_is_rejected() {
        let config = ProviderConfig::new("ftp://pi.hole", "token");

        let errors = resolve_with(&config, no_env).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].attribute(), "url");
        let diag = errors[0].to_diagnostic();
        assert_eq!(diag.summary, "Invalid Pi-hole URL");
        assert_eq!(diag.attribute.as_deref(), Some("url"));
    }

    #[test]
    fn from_state_maps_attribute_values() {
        let state = ResourceState::new()
            .with_string("url", "http://pi.hole")
            .with_unknown("token");

        let config = ProviderConfig::from_state(&state);

        assert_eq!(config.url, ConfigValue::Known("http://pi.hole".to_string()));
        assert_eq!(config.token, ConfigValue::Unknown);
        assert_eq!(
            ProviderConfig::from_state(&ResourceState::new()),
            ProviderConfig::default()
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let resolved = ResolvedConfig {
            url: "http://pi.hole/admin/api.php".to_string(),
            token: "super-secret".to_string(),
        };

        let output = format!("{:?}", resolved);
        assert!(!output.contains("super-secret"));
        assert!(output.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn resolve_reads_process_environment() {
        std::env::set_var(URL_ENV, "http://192.168.1.2");
        std::env::set_var(TOKEN_ENV, "env-token");

        let resolved = resolve(&ProviderConfig::default()).unwrap();
        assert_eq!(resolved.url, "http://192.168.1.2/admin/api.php");
        assert_eq!(resolved.token, "env-token");

        std::env::remove_var(URL_ENV);
        std::env::remove_var(TOKEN_ENV);
    }

    #[test]
    #[serial]
    fn resolve_without_environment_reports_both_missing() {
        std::env::remove_var(URL_ENV);
        std::env::remove_var(TOKEN_ENV);

        let errors = resolve(&ProviderConfig::default()).unwrap_err();
        let attributes: Vec<_> = errors.iter().map(ConfigError::attribute).collect();
        assert_eq!(attributes, vec!["url", "token"]);
    }
}
