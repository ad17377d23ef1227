//! Attribute snapshots and diagnostics exchanged with the host
//!
//! Every attribute the provider manages is a string, so a snapshot is a flat
//! map from attribute name to a string, null or not-yet-known value.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Null,
    /// Known only after apply, e.g. a computed attribute during planning
    Unknown,
    String(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AttributeValue::Unknown)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("attribute '{0}' is not set")]
    Missing(String),

    #[error("attribute '{0}' is null")]
    Null(String),

    #[error("attribute '{0}' is not known yet")]
    Unknown(String),
}

/// Snapshot of one resource instance (or of the provider configuration block)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    values: BTreeMap<String, AttributeValue>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_string(name, value);
        self
    }

    pub fn with_unknown(mut self, name: &str) -> Self {
        self.values.insert(name.to_string(), AttributeValue::Unknown);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// Known string value of `name`; null, unknown and absent are errors
    pub fn get_string(&self, name: &str) -> Result<String, StateError> {
        match self.values.get(name) {
            Some(AttributeValue::String(s)) => Ok(s.clone()),
            Some(AttributeValue::Null) => Err(StateError::Null(name.to_string())),
            Some(AttributeValue::Unknown) => Err(StateError::Unknown(name.to_string())),
            None => Err(StateError::Missing(name.to_string())),
        }
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .insert(name.to_string(), AttributeValue::String(value.into()));
    }

    pub fn set_null(&mut self, name: &str) {
        self.values.insert(name.to_string(), AttributeValue::Null);
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of this snapshot without `name`, for comparisons that ignore it
    pub fn without(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.values.remove(name);
        copy
    }
}

/// Diagnostic returned to the host alongside (or instead of) a new snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
