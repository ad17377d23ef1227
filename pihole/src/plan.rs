//! Change planning and application
//!
//! Decides what a desired snapshot means for an existing one, then drives a
//! [`Resource`] through the matching operations. Replacement is
//! delete-then-create, and create is skipped when delete fails.

use crate::resources::{
    CreateResourceRequest, DeleteResourceRequest, Resource, UpdateResourceRequest,
};
use crate::schema::Schema;
use crate::types::{has_errors, Diagnostic, ResourceState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedChange {
    NoOp,
    Create,
    Update { attributes: Vec<String> },
    Replace { attributes: Vec<String> },
    Delete,
}

/// Compare the configurable attributes of `prior` and `proposed`.
/// Computed-only attributes never drive a change.
pub fn plan_change(
    schema: &Schema,
    prior: Option<&ResourceState>,
    proposed: Option<&ResourceState>,
) -> PlannedChange {
    let (prior, proposed) = match (prior, proposed) {
        (None, None) => return PlannedChange::NoOp,
        (None, Some(_)) => return PlannedChange::Create,
        (Some(_), None) => return PlannedChange::Delete,
        (Some(prior), Some(proposed)) => (prior, proposed),
    };

    let changed: Vec<_> = schema
        .configurable()
        .filter(|attr| {
            let new = proposed.get(&attr.name);
            new.is_some_and(|v| v.is_unknown()) || prior.get(&attr.name) != new
        })
        .collect();

    if changed.is_empty() {
        return PlannedChange::NoOp;
    }

    let attributes = changed.iter().map(|a| a.name.clone()).collect();
    if changed.iter().any(|a| a.requires_replace) {
        PlannedChange::Replace { attributes }
    } else {
        PlannedChange::Update { attributes }
    }
}

/// Result of applying one planned change. `new_state` is what the host
/// should record, even when `diagnostics` carries errors.
#[derive(Debug)]
pub struct ApplyOutcome {
    pub new_state: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}

pub async fn apply_change(
    resource: &dyn Resource,
    change: &PlannedChange,
    prior: Option<ResourceState>,
    proposed: Option<ResourceState>,
) -> ApplyOutcome {
    match (change, prior, proposed) {
        (PlannedChange::NoOp, prior, _) => ApplyOutcome {
            new_state: prior,
            diagnostics: vec![],
        },
        (PlannedChange::Create, _, Some(proposed)) => create(resource, proposed).await,
        (PlannedChange::Update { .. }, Some(prior), Some(proposed)) => {
            let response = resource
                .update(UpdateResourceRequest {
                    prior_state: prior,
                    planned_state: proposed,
                })
                .await;
            ApplyOutcome {
                new_state: Some(response.new_state),
                diagnostics: response.diagnostics,
            }
        }
        (PlannedChange::Replace { attributes }, Some(prior), Some(proposed)) => {
            tracing::info!(
                resource = %resource.type_name(),
                attributes = ?attributes,
                "Replacing resource"
            );
            let mut diagnostics = replacement_warnings(attributes);
            let deleted = delete(resource, prior).await;
            if has_errors(&deleted.diagnostics) {
                diagnostics.extend(deleted.diagnostics);
                return ApplyOutcome {
                    new_state: deleted.new_state,
                    diagnostics,
                };
            }
            let created = create(resource, proposed).await;
            diagnostics.extend(created.diagnostics);
            ApplyOutcome {
                new_state: created.new_state,
                diagnostics,
            }
        }
        (PlannedChange::Delete, Some(prior), _) => delete(resource, prior).await,
        (change, prior, _) => ApplyOutcome {
            new_state: prior,
            diagnostics: vec![Diagnostic::error(
                "Invalid plan",
                format!("{:?} is missing the snapshot it needs", change),
            )],
        },
    }
}

fn replacement_warnings(attributes: &[String]) -> Vec<Diagnostic> {
    attributes
        .iter()
        .map(|name| {
            Diagnostic::warning(
                format!("Attribute '{}' requires resource replacement", name),
                "The existing record is deleted before the new one is created",
            )
            .with_attribute(name.as_str())
        })
        .collect()
}

async fn create(resource: &dyn Resource, proposed: ResourceState) -> ApplyOutcome {
    let response = resource
        .create(CreateResourceRequest {
            planned_state: proposed,
        })
        .await;
    ApplyOutcome {
        new_state: response.new_state,
        diagnostics: response.diagnostics,
    }
}

/// On failure the prior snapshot is kept
async fn delete(resource: &dyn Resource, prior: ResourceState) -> ApplyOutcome {
    let response = resource
        .delete(DeleteResourceRequest {
            prior_state: prior.clone(),
        })
        .await;
    let new_state = if has_errors(&response.diagnostics) {
        Some(prior)
    } else {
        None
    };
    ApplyOutcome {
        new_state,
        diagnostics: response.diagnostics,
    }
}
