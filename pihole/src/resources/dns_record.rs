//! Custom DNS record resource

use super::{
    import_state_passthrough_id, reconcile_diagnostic, required_string, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use crate::api::DnsRecord;
use crate::provider_data::PiholeProviderData;
use crate::reconcile::{DnsRecordReconciler, DnsRecordState};
use crate::schema::{AttributeBuilder, Schema, SchemaBuilder};
use crate::types::{AttributeValue, Diagnostic, ResourceState};
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "pihole_dnsrecord";

pub struct DnsRecordResource {
    reconciler: DnsRecordReconciler,
}

impl DnsRecordResource {
    pub fn new(provider_data: &PiholeProviderData) -> Self {
        Self {
            reconciler: DnsRecordReconciler::new(provider_data.client.clone()),
        }
    }

    pub fn schema_static() -> Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();

        SCHEMA
            .get_or_init(|| {
                SchemaBuilder::new()
                    .version(0)
                    .description("Manages a custom DNS (A/AAAA) record on a Pi-hole server")
                    .attribute(
                        AttributeBuilder::new("id")
                            .description("Identifier of the record, the domain it is stored under")
                            .computed()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("last_updated")
                            .description("Time of the last successful create, read or update")
                            .computed()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("domain")
                            .description("Domain name to resolve")
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("ip")
                            .description("IP address the domain resolves to")
                            .required()
                            .build(),
                    )
                    .build()
            })
            .clone()
    }

    fn desired_record(state: &ResourceState) -> Result<DnsRecord, Vec<Diagnostic>> {
        let domain = required_string(state, "domain");
        let ip = required_string(state, "ip");

        match (domain, ip) {
            (Ok(domain), Ok(ip)) => Ok(DnsRecord::new(domain, ip)),
            (domain, ip) => Err([domain.err(), ip.err()].into_iter().flatten().collect()),
        }
    }

    /// Identity a prior snapshot was stored under; older states may lack `id`
    fn prior_id(state: &ResourceState) -> Result<String, Diagnostic> {
        state
            .get_string("id")
            .or_else(|_| state.get_string("domain"))
            .map_err(|e| {
                Diagnostic::error("Missing id", format!("The prior state has no identity: {}", e))
                    .with_attribute("id")
            })
    }

    /// State after an update that was applied but not read back. Identity
    /// follows the new domain so the next read finds the record; `last_updated`
    /// stays at the last confirmed value.
    fn unverified_state(prior: &ResourceState, desired: &DnsRecord) -> ResourceState {
        let mut state = ResourceState::new()
            .with_string("id", desired.domain.as_str())
            .with_string("domain", desired.domain.as_str())
            .with_string("ip", desired.ip.as_str());
        match prior.get_string("last_updated") {
            Ok(stamp) => state.set_string("last_updated", stamp),
            Err(_) => state.set_null("last_updated"),
        }
        state
    }

    fn to_state(state: DnsRecordState) -> ResourceState {
        ResourceState::new()
            .with_string("id", state.id)
            .with_string("domain", state.domain)
            .with_string("ip", state.ip)
            .with_string("last_updated", state.last_updated)
    }
}

#[async_trait]
impl Resource for DnsRecordResource {
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

        if let Some(AttributeValue::String(domain)) = request.config.get("domain") {
            if domain.trim().is_empty() {
                diagnostics.push(
                    Diagnostic::error("Invalid domain", "The 'domain' attribute must not be empty")
                        .with_attribute("domain"),
                );
            }
        }

        if let Some(AttributeValue::String(ip)) = request.config.get("ip") {
            if ip.parse::<IpAddr>().is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid IP address",
                        format!("'{}' is not a valid IPv4 or IPv6 address", ip),
                    )
                    .with_attribute("ip"),
                );
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
                diagnostics: vec![reconcile_diagnostic("Error creating DNS record", &e)],
            },
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let id = match Self::prior_id(&request.current_state) {
            Ok(id) => id,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        match self.reconciler.read(&id).await {
            Ok(state) => ReadResourceResponse {
                new_state: state.map(Self::to_state),
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![reconcile_diagnostic("Error reading DNS record", &e)],
            },
        }
    }

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let old_id = Self::prior_id(&request.prior_state);
        let desired = Self::desired_record(&request.planned_state);

        let (old_id, desired) = match (old_id, desired) {
            (Ok(old_id), Ok(desired)) => (old_id, desired),
            (old_id, desired) => {
                let mut diagnostics: Vec<_> = old_id.err().into_iter().collect();
                diagnostics.extend(desired.err().unwrap_or_default());
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        match self.reconciler.update(&old_id, &desired).await {
            Ok(state) => UpdateResourceResponse {
                new_state: Self::to_state(state),
                diagnostics: vec![],
            },
            Err(e) if e.is_unverified() => UpdateResourceResponse {
                new_state: Self::unverified_state(&request.prior_state, &desired),
                diagnostics: vec![reconcile_diagnostic(
                    "DNS record updated but not verified",
                    &e,
                )],
            },
            Err(e) => {
                let summary = if e.is_partial() {
                    "DNS record removed but not replaced"
                } else {
                    "Error updating DNS record"
                };
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![reconcile_diagnostic(summary, &e)],
                }
            }
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
                diagnostics: vec![reconcile_diagnostic("Error deleting DNS record", &e)],
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
        import_state_passthrough_id("id", &request, &mut response);
        response
    }
}
