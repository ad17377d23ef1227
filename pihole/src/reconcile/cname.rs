use std::sync::Arc;

use super::{timestamp, Operation, ReconcileError, RecordKind, Result};
use crate::api::{CnameRecord, PiholeApi};

/// Snapshot of a managed CNAME record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnameRecordState {
    pub domain: String,
    pub target: String,
    pub last_updated: String,
}

impl CnameRecordState {
    pub fn record(&self) -> CnameRecord {
        CnameRecord::new(self.domain.as_str(), self.target.as_str())
    }
}

/// CNAME records have no update path on the server: any change to `domain`
/// or `target` has to be planned as delete followed by create.
pub struct CnameReconciler {
    client: Arc<dyn PiholeApi>,
}

impl CnameReconciler {
    pub fn new(client: Arc<dyn PiholeApi>) -> Self {
        Self { client }
    }

    pub async fn create(&self, desired: &CnameRecord) -> Result<CnameRecordState> {
        tracing::info!(domain = %desired.domain, target = %desired.target, "Creating CNAME record");

        self.client
            .add_custom_cname(desired)
            .await
            .map_err(|e| {
                ReconcileError::remote(Operation::Create, RecordKind::Cname, &desired.domain, e)
            })?;

        Ok(CnameRecordState {
            domain: desired.domain.clone(),
            target: desired.target.clone(),
            last_updated: timestamp(),
        })
    }

    pub async fn read(&self, domain: &str) -> Result<Option<CnameRecordState>> {
        match self.client.get_custom_cname(domain).await {
            Ok(stored) => Ok(Some(CnameRecordState {
                domain: stored.domain,
                target: stored.target,
                last_updated: timestamp(),
            })),
            Err(e) if e.is_not_found() => {
                tracing::info!(domain = %domain, "CNAME record no longer exists");
                Ok(None)
            }
            Err(e) => Err(ReconcileError::remote(Operation::Read, RecordKind::Cname, domain, e)),
        }
    }

    pub async fn delete(&self, record: &CnameRecord) -> Result<()> {
        tracing::info!(domain = %record.domain, target = %record.target, "Deleting CNAME record");

        self.client
            .delete_custom_cname(record)
            .await
            .map_err(|e| {
                ReconcileError::remote(Operation::Delete, RecordKind::Cname, &record.domain, e)
            })
    }

    pub fn import(&self, external_id: &str) -> String {
        external_id.to_string()
    }
}
