//! Custom CNAME record resource

use super::{
    import_state_passthrough_id, reconcile_diagnostic, required_string, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use crate::api::CnameRecord;
use crate::provider_data::PiholeProviderData;
use crate::reconcile::{CnameReconciler, CnameRecordState};
use crate::schema::{AttributeBuilder, Schema, SchemaBuilder};
use crate::types::{AttributeValue, Diagnostic, ResourceState};
use async_trait::async_trait;
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "pihole_cname";

pub struct CnameResource {
    reconciler: CnameReconciler,
}

impl CnameResource {
    pub fn new(provider_data: &PiholeProviderData) -> Self {
        Self {
            reconciler: CnameReconciler::new(provider_data.client.clone()),
        }
    }

    pub fn schema_static() -> Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();

        SCHEMA
            .get_or_init(|| {
                SchemaBuilder::new()
                    .version(0)
                    .description("Manages a custom CNAME record on a Pi-hole server")
                    .attribute(
                        AttributeBuilder::new("last_updated")
                            .description("Time of the last successful create or read")
                            .computed()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("domain")
                            .description("Alias domain")
                            .required()
                            .requires_replace()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("target")
                            .description("Domain the alias points to")
                            .required()
                            .requires_replace()
                            .build(),
                    )
                    .build()
            })
            .clone()
    }

    fn desired_record(state: &ResourceState) -> Result<CnameRecord, Vec<Diagnostic>> {
        let domain = required_string(state, "domain");
        let target = required_string(state, "target");

        match (domain, target) {
            (Ok(domain), Ok(target)) => Ok(CnameRecord::new(domain, target)),
            (domain, target) => Err([domain.err(), target.err()].into_iter().flatten().collect()),
        }
    }

    fn to_state(state: CnameRecordState) -> ResourceState {
        ResourceState::new()
            .with_string("domain", state.domain)
            .with_string("target", state.target)
            .with_string("last_updated", state.last_updated)
    }
}

#[async_trait]
impl Resource for CnameResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn validate(
        &self,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        for name in ["domain", "target"] {
            if let Some(AttributeValue::String(value)) = request.config.get(name) {
                if value.trim().is_empty() {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Invalid {}", name),
                            format!("The '{}' attribute must not be empty", name),
                        )
                        .with_attribute(name),
                    );
                }
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let desired = match Self::desired_record(&request.planned_state) {
            Ok(record) => record,
            Err(diagnostics) => {
                return CreateResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
        };

        match self.reconciler.create(&desired).await {
            Ok(state) => CreateResourceResponse {
                new_state: Some(Self::to_state(state)),
                diagnostics: vec![],
            },
            Err(e) => CreateResourceResponse {
                new_state: None,
                diagnostics: vec![reconcile_diagnostic("Error creating CNAME record", &e)],
            },
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let domain = match required_string(&request.current_state, "domain") {
            Ok(domain) => domain,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        match self.reconciler.read(&domain).await {
            Ok(state) => ReadResourceResponse {
                new_state: state.map(Self::to_state),
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![reconcile_diagnostic("Error reading CNAME record", &e)],
            },
        }
    }

    /// Both configurable attributes force replacement, so a correct plan never
    /// routes here
    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.prior_state,
            diagnostics: vec![Diagnostic::error(
                "CNAME records cannot be updated in place",
                "Changing 'domain' or 'target' replaces the record; plan the change as delete then create",
            )],
        }
    }

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let record = match Self::desired_record(&request.prior_state) {
            Ok(record) => record,
            Err(diagnostics) => return DeleteResourceResponse { diagnostics },
        };

        match self.reconciler.delete(&record).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![reconcile_diagnostic("Error deleting CNAME record", &e)],
            },
        }
    }

    async fn import_state(
        &self,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        let request = ImportResourceStateRequest {
            type_name: TYPE_NAME.to_string(),
            id: self.reconciler.import(&request.id),
        };
        import_state_passthrough_id("domain", &request, &mut response);
        response
    }
}
