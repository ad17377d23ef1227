use std::sync::Arc;

use super::{timestamp, Operation, ReconcileError, RecordKind, Result, UpdateAttempt};
use crate::api::{DnsRecord, PiholeApi};

/// Snapshot of a managed DNS record. `id` always mirrors the domain the
/// record was created, updated or imported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordState {
    pub id: String,
    pub domain: String,
    pub ip: String,
    pub last_updated: String,
}

impl DnsRecordState {
    /// The remote pair this snapshot describes
    pub fn record(&self) -> DnsRecord {
        DnsRecord::new(self.domain.as_str(), self.ip.as_str())
    }
}

pub struct DnsRecordReconciler {
    client: Arc<dyn PiholeApi>,
}

impl DnsRecordReconciler {
    pub fn new(client: Arc<dyn PiholeApi>) -> Self {
        Self { client }
    }

    pub async fn create(&self, desired: &DnsRecord) -> Result<DnsRecordState> {
        tracing::info!(domain = %desired.domain, ip = %desired.ip, "Creating custom DNS record");

        self.client
            .add_custom_dns(desired)
            .await
            .map_err(|e| {
                ReconcileError::remote(Operation::Create, RecordKind::Dns, &desired.domain, e)
            })?;

        Ok(DnsRecordState {
            id: desired.domain.clone(),
            domain: desired.domain.clone(),
            ip: desired.ip.clone(),
            last_updated: timestamp(),
        })
    }

    /// `Ok(None)` means the server no longer has the record
    pub async fn read(&self, id: &str) -> Result<Option<DnsRecordState>> {
        match self.client.get_custom_dns(id).await {
            Ok(stored) => Ok(Some(DnsRecordState {
                id: id.to_string(),
                domain: stored.domain,
                ip: stored.ip,
                last_updated: timestamp(),
            })),
            Err(e) if e.is_not_found() => {
                tracing::info!(domain = %id, "Custom DNS record no longer exists");
                Ok(None)
            }
            Err(e) => Err(ReconcileError::remote(Operation::Read, RecordKind::Dns, id, e)),
        }
    }

    /// Replace the record stored under `old_id` with `desired`, then read it
    /// back under the new domain. There is no rollback if the read-back fails
    /// or if the old record was removed and the new one refused.
    pub async fn update(&self, old_id: &str, desired: &DnsRecord) -> Result<DnsRecordState> {
        tracing::info!(
            old_domain = %old_id,
            domain = %desired.domain,
            ip = %desired.ip,
            "Updating custom DNS record"
        );

        let mut attempt = UpdateAttempt::begin(RecordKind::Dns, old_id, &desired.domain);

        if let Err(e) = self.client.update_custom_dns(old_id, desired).await {
            return Err(attempt.fail(e));
        }
        attempt.mutation_applied();

        let stored = match self.client.get_custom_dns(&desired.domain).await {
            Ok(stored) => stored,
            Err(e) => return Err(attempt.fail(e)),
        };
        attempt.verified();

        Ok(DnsRecordState {
            id: stored.domain.clone(),
            domain: stored.domain,
            ip: stored.ip,
            last_updated: timestamp(),
        })
    }

    /// Delete by the full pair. Deleting an already-absent record is reported
    /// the way the server reports it.
    pub async fn delete(&self, record: &DnsRecord) -> Result<()> {
        tracing::info!(domain = %record.domain, ip = %record.ip, "Deleting custom DNS record");

        self.client
            .delete_custom_dns(record)
            .await
            .map_err(|e| {
                ReconcileError::remote(Operation::Delete, RecordKind::Dns, &record.domain, e)
            })
    }

    /// The import id is the domain, verbatim
    pub fn import(&self, external_id: &str) -> String {
        external_id.to_string()
    }
}
