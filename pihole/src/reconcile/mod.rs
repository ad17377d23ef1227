//! Record reconcilers
//!
//! A reconciler turns a desired record and/or a prior snapshot into the
//! sequence of [`PiholeApi`](crate::api::PiholeApi) calls that realizes it,
//! and folds the server's answer back into a new snapshot. Reconcilers hold
//! nothing but the shared client handle: the caller serializes operations on
//! one record, and every remote failure is returned once, unretried.

pub mod cname;
pub mod dns;

#[cfg(test)]
mod cname_test;

pub use cname::{CnameReconciler, CnameRecordState};
pub use dns::{DnsRecordReconciler, DnsRecordState};

use crate::api::ApiError;
use std::fmt;
use thiserror::Error;

/// RFC 850 layout, rendered in UTC
pub const LAST_UPDATED_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S UTC";

/// Value for `last_updated` after a successful remote call
pub fn timestamp() -> String {
    chrono::Utc::now().format(LAST_UPDATED_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Dns,
    Cname,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Dns => write!(f, "DNS record"),
            RecordKind::Cname => write!(f, "CNAME record"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Why the read-back after an applied update did not confirm it
#[derive(Debug, Error)]
pub enum VerificationFailure {
    #[error("no record found under the new domain")]
    NotFound,

    #[error(transparent)]
    Remote(ApiError),
}

impl From<ApiError> for VerificationFailure {
    fn from(error: ApiError) -> Self {
        if error.is_not_found() {
            VerificationFailure::NotFound
        } else {
            VerificationFailure::Remote(error)
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The remote call failed; nothing was committed on the caller's side
    #[error("failed to {operation} {kind} '{id}': {source}")]
    Remote {
        operation: Operation,
        kind: RecordKind,
        id: String,
        #[source]
        source: ApiError,
    },

    /// The update reached the server but could not be read back, so the
    /// remote record may differ from every snapshot the caller holds
    #[error("{kind} '{old_id}' was updated but reading back '{new_id}' failed: {reason}")]
    UpdateUnverified {
        kind: RecordKind,
        old_id: String,
        new_id: String,
        #[source]
        reason: VerificationFailure,
    },

    /// The old record was removed but its replacement was not stored, so the
    /// server holds neither the prior nor the desired record
    #[error("{kind} '{old_id}' was removed but '{new_id}' could not be added: {source}")]
    UpdatePartial {
        kind: RecordKind,
        old_id: String,
        new_id: String,
        #[source]
        source: ApiError,
    },
}

impl ReconcileError {
    pub(crate) fn remote(
        operation: Operation,
        kind: RecordKind,
        id: impl Into<String>,
        source: ApiError,
    ) -> Self {
        ReconcileError::Remote {
            operation,
            kind,
            id: id.into(),
            source,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ReconcileError::Remote { operation, .. } => *operation,
            ReconcileError::UpdateUnverified { .. } | ReconcileError::UpdatePartial { .. } => {
                Operation::Update
            }
        }
    }

    /// True when the update was applied but not read back
    pub fn is_unverified(&self) -> bool {
        matches!(self, ReconcileError::UpdateUnverified { .. })
    }

    /// True when the update removed the old record without adding the new one
    pub fn is_partial(&self) -> bool {
        matches!(self, ReconcileError::UpdatePartial { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    Mutated,
    Verified,
    Failed,
}

/// Two-step update: mutate under the old identity, then verify under the new one.
///
/// The phase reached before a failure decides which error the caller sees:
/// failing while `Idle` means nothing changed, failing once `Mutated` means
/// the server changed and the local view is stale.
#[derive(Debug)]
pub struct UpdateAttempt {
    kind: RecordKind,
    old_id: String,
    new_id: String,
    phase: UpdatePhase,
}

impl UpdateAttempt {
    pub fn begin(kind: RecordKind, old_id: &str, new_id: &str) -> Self {
        Self {
            kind,
            old_id: old_id.to_string(),
            new_id: new_id.to_string(),
            phase: UpdatePhase::Idle,
        }
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    pub fn mutation_applied(&mut self) {
        debug_assert_eq!(self.phase, UpdatePhase::Idle);
        self.phase = UpdatePhase::Mutated;
        tracing::debug!("{} '{}' mutated, verifying as '{}'", self.kind, self.old_id, self.new_id);
    }

    pub fn verified(&mut self) {
        debug_assert_eq!(self.phase, UpdatePhase::Mutated);
        self.phase = UpdatePhase::Verified;
    }

    /// Record a failed step and build the matching error.
    /// A [`ApiError::PartialUpdate`] counts as a mutation that went wrong halfway.
    pub fn fail(&mut self, error: ApiError) -> ReconcileError {
        let previous = std::mem::replace(&mut self.phase, UpdatePhase::Failed);
        match (previous, error) {
            (UpdatePhase::Idle | UpdatePhase::Failed, ApiError::PartialUpdate { source, .. }) => {
                tracing::error!(
                    "{} '{}' was removed but '{}' could not be added: {}",
                    self.kind,
                    self.old_id,
                    self.new_id,
                    source
                );
                ReconcileError::UpdatePartial {
                    kind: self.kind,
                    old_id: self.old_id.clone(),
                    new_id: self.new_id.clone(),
                    source: *source,
                }
            }
            (UpdatePhase::Idle | UpdatePhase::Failed, error) => {
                ReconcileError::remote(Operation::Update, self.kind, &self.old_id, error)
            }
            (UpdatePhase::Mutated | UpdatePhase::Verified, error) => {
                tracing::error!(
                    "{} '{}' was updated but could not be verified as '{}': {}",
                    self.kind,
                    self.old_id,
                    self.new_id,
                    error
                );
                ReconcileError::UpdateUnverified {
                    kind: self.kind,
                    old_id: self.old_id.clone(),
                    new_id: self.new_id.clone(),
                    reason: error.into(),
                }
            }
        }
    }
}
