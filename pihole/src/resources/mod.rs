//! Resource implementations
//!
//! Each resource maps host requests onto a reconciler and reports failures as
//! diagnostics. A response never carries both a fresh snapshot and an error
//! for the same attempt unless the remote side is known to have changed.

pub mod cname;
pub mod dns_record;


pub use cname::CnameResource;
pub use dns_record::DnsRecordResource;

use crate::reconcile::ReconcileError;
use crate::schema::Schema;
use crate::types::{Diagnostic, ResourceState};
use async_trait::async_trait;

/// Type name should be constant and match the key in the provider's resource map
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    /// Called during plan; unknown values are skipped
    async fn validate(&self, request: ValidateResourceConfigRequest)
        -> ValidateResourceConfigResponse;

    /// `new_state` is `None` unless the record was created
    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse;

    /// `new_state` is `None` when the record no longer exists remotely
    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse;

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse;

    async fn import_state(
        &self,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse;
}

pub struct ValidateResourceConfigRequest {
    pub config: ResourceState,
}

pub struct ValidateResourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct CreateResourceRequest {
    pub planned_state: ResourceState,
}

pub struct CreateResourceResponse {
    pub new_state: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadResourceRequest {
    pub current_state: ResourceState,
}

pub struct ReadResourceResponse {
    pub new_state: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct UpdateResourceRequest {
    pub prior_state: ResourceState,
    pub planned_state: ResourceState,
}

pub struct UpdateResourceResponse {
    pub new_state: ResourceState,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct DeleteResourceRequest {
    pub prior_state: ResourceState,
}

pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
}

pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedResource {
    pub type_name: String,
    pub state: ResourceState,
}

/// Sets the import ID on a single attribute of an otherwise empty state.
/// The next read fills in everything else.
pub fn import_state_passthrough_id(
    attribute: &str,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.is_empty() {
        response.diagnostics.push(
            Diagnostic::error(
                "Invalid import ID",
                format!("An empty ID cannot be imported into '{}'", attribute),
            )
            .with_attribute(attribute),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state: ResourceState::new().with_string(attribute, request.id.as_str()),
    });
}

/// Known string attribute, or an attribute-scoped diagnostic
pub(crate) fn required_string(state: &ResourceState, name: &str) -> Result<String, Diagnostic> {
    state.get_string(name).map_err(|e| {
        Diagnostic::error(
            format!("Missing {}", name),
            format!("The '{}' attribute is required: {}", name, e),
        )
        .with_attribute(name)
    })
}

pub(crate) fn reconcile_diagnostic(summary: &str, error: &ReconcileError) -> Diagnostic {
    Diagnostic::error(summary, error.to_string())
}
