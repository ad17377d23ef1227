//! In-memory Pi-hole
//!
//! Implements [`PiholeApi`] over two hash maps with the same observable rules
//! as a Pi-hole v5 server: domains are stored lowercased, duplicates are
//! rejected and deletes must name the exact pair. Every call is journaled and
//! failures can be queued, which makes it the test double for the reconcilers
//! and the provider.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{ApiError, CnameRecord, DnsRecord, PiholeApi};

/// One call received by [`MemoryPihole`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    AddDns(DnsRecord),
    GetDns(String),
    UpdateDns(String, DnsRecord),
    DeleteDns(DnsRecord),
    AddCname(CnameRecord),
    GetCname(String),
    DeleteCname(CnameRecord),
}

impl ApiCall {
    /// True for calls that change server state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ApiCall::GetDns(_) | ApiCall::GetCname(_))
    }
}

type CallMatcher = fn(&ApiCall) -> bool;

#[derive(Default)]
struct State {
    dns: HashMap<String, String>,
    cname: HashMap<String, String>,
    journal: Vec<ApiCall>,
    faults: Vec<(CallMatcher, ApiError)>,
}

impl State {
    /// Journal `call` and hand back a queued failure for it, if any
    fn record(&mut self, call: ApiCall) -> Result<(), ApiError> {
        let fault = self.faults.iter().position(|(matches, _)| matches(&call));
        self.journal.push(call);
        match fault {
            Some(index) => Err(self.faults.remove(index).1),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryPihole {
    state: Arc<Mutex<State>>,
}

impl MemoryPihole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a DNS record without journaling a call
    pub async fn insert_dns(&self, domain: &str, ip: &str) {
        let mut state = self.state.lock().await;
        state.dns.insert(domain.to_ascii_lowercase(), ip.to_string());
    }

    /// Seed a CNAME record without journaling a call
    pub async fn insert_cname(&self, domain: &str, target: &str) {
        let mut state = self.state.lock().await;
        state
            .cname
            .insert(domain.to_ascii_lowercase(), target.to_ascii_lowercase());
    }

    /// Drop a DNS record behind the provider's back
    pub async fn remove_dns(&self, domain: &str) {
        let mut state = self.state.lock().await;
        state.dns.remove(&domain.to_ascii_lowercase());
    }

    /// Fail the next call accepted by `matches` with `error`
    pub async fn fail_next(&self, matches: CallMatcher, error: ApiError) {
        self.state.lock().await.faults.push((matches, error));
    }

    /// Every call received so far, oldest first
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().await.journal.clone()
    }

    /// Calls that changed server state, oldest first
    pub async fn mutations(&self) -> Vec<ApiCall> {
        self.calls()
            .await
            .into_iter()
            .filter(ApiCall::is_mutation)
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.journal.clear();
    }

    pub async fn dns_records(&self) -> Vec<DnsRecord> {
        let state = self.state.lock().await;
        let mut records: Vec<_> = state
            .dns
            .iter()
            .map(|(domain, ip)| DnsRecord::new(domain.as_str(), ip.as_str()))
            .collect();
        records.sort_by(|a, b| a.domain.cmp(&b.domain));
        records
    }

    pub async fn cname_records(&self) -> Vec<CnameRecord> {
        let state = self.state.lock().await;
        let mut records: Vec<_> = state
            .cname
            .iter()
            .map(|(domain, target)| CnameRecord::new(domain.as_str(), target.as_str()))
            .collect();
        records.sort_by(|a, b| a.domain.cmp(&b.domain));
        records
    }
}

fn add_dns(state: &mut State, record: &DnsRecord) -> Result<(), ApiError> {
    let domain = record.domain.to_ascii_lowercase();
    if state.dns.contains_key(&domain) {
        return Err(ApiError::Rejected {
            message: "This domain already has a custom DNS entry for an IPv4".to_string(),
        });
    }
    state.dns.insert(domain, record.ip.clone());
    Ok(())
}

fn delete_dns(state: &mut State, record: &DnsRecord) -> Result<(), ApiError> {
    let domain = record.domain.to_ascii_lowercase();
    match state.dns.get(&domain) {
        Some(ip) if *ip == record.ip => {
            state.dns.remove(&domain);
            Ok(())
        }
        _ => Err(ApiError::Rejected {
            message: "This domain/ip association does not exist".to_string(),
        }),
    }
}

#[async_trait]
impl PiholeApi for MemoryPihole {
    async fn add_custom_dns(&self, record: &DnsRecord) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.record(ApiCall::AddDns(record.clone()))?;
        add_dns(&mut state, record)
    }

    async fn get_custom_dns(&self, domain: &str) -> Result<DnsRecord, ApiError> {
        let mut state = self.state.lock().await;
        state.record(ApiCall::GetDns(domain.to_string()))?;

        let key = domain.to_ascii_lowercase();
        state
            .dns
            .get(&key)
            .map(|ip| DnsRecord::new(key.as_str(), ip.as_str()))
            .ok_or_else(|| ApiError::NotFound(domain.to_string()))
    }

    async fn update_custom_dns(
        &self,
        old_domain: &str,
        record: &DnsRecord,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.record(ApiCall::UpdateDns(old_domain.to_string(), record.clone()))?;

        let old_key = old_domain.to_ascii_lowercase();
        let old_ip = state
            .dns
            .get(&old_key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(old_domain.to_string()))?;

        let removed = DnsRecord::new(old_key, old_ip);
        delete_dns(&mut state, &removed)?;
        add_dns(&mut state, record).map_err(|e| removed.into_partial_update(e))
    }

    async fn delete_custom_dns(&self, record: &DnsRecord) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.record(ApiCall::DeleteDns(record.clone()))?;
        delete_dns(&mut state, record)
    }

    async fn add_custom_cname(&self, record: &CnameRecord) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.record(ApiCall::AddCname(record.clone()))?;

        let domain = record.domain.to_ascii_lowercase();
        if state.cname.contains_key(&domain) {
            return Err(ApiError::Rejected {
                message: format!("There is already a CNAME record for {}", domain),
            });
        }
        state
            .cname
            .insert(domain, record.target.to_ascii_lowercase());
        Ok(())
    }

    async fn get_custom_cname(&self, domain: &str) -> Result<CnameRecord, ApiError> {
        let mut state = self.state.lock().await;
        state.record(ApiCall::GetCname(domain.to_string()))?;

        let key = domain.to_ascii_lowercase();
        state
            .cname
            .get(&key)
            .map(|target| CnameRecord::new(key.as_str(), target.as_str()))
            .ok_or_else(|| ApiError::NotFound(domain.to_string()))
    }

    async fn delete_custom_cname(&self, record: &CnameRecord) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.record(ApiCall::DeleteCname(record.clone()))?;

        let domain = record.domain.to_ascii_lowercase();
        match state.cname.get(&domain) {
            Some(target) if target.eq_ignore_ascii_case(&record.target) => {
                state.cname.remove(&domain);
                Ok(())
            }
            _ => Err(ApiError::Rejected {
                message: "This domain/target association does not exist".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_domains_lowercased() {
        let pihole = MemoryPihole::new();
        pihole
            .add_custom_dns(&DnsRecord::new("Test.Example.COM", "1.2.3.4"))
            .await
            .unwrap();

        let record = pihole.get_custom_dns("test.example.com").await.unwrap();
        assert_eq!(record.domain, "test.example.com");
    }

    #[tokio::test]
    async fn rejects_duplicate_domains() {
        let pihole = MemoryPihole::new();
        pihole.insert_dns("test.example.com", "1.2.3.4").await;

        let result = pihole
            .add_custom_dns(&DnsRecord::new("test.example.com", "5.6.7.8"))
            .await;
        assert!(matches!(result, Err(ApiError::Rejected { .. })));
    }

    #[tokio::test]
    async fn delete_requires_exact_pair() {
        let pihole = MemoryPihole::new();
        pihole.insert_dns("test.example.com", "1.2.3.4").await;

        let wrong_ip = pihole
            .delete_custom_dns(&DnsRecord::new("test.example.com", "9.9.9.9"))
            .await;
        assert!(wrong_ip.is_err());
        assert_eq!(pihole.dns_records().await.len(), 1);
    }

    #[tokio::test]
    async fn update_onto_a_taken_domain_loses_the_old_record() {
        let pihole = MemoryPihole::new();
        pihole.insert_dns("old.example.com", "1.2.3.4").await;
        pihole.insert_dns("new.example.com", "9.9.9.9").await;

        let result = pihole
            .update_custom_dns("old.example.com", &DnsRecord::new("new.example.com", "2.3.4.5"))
            .await;

        match result {
            Err(ApiError::PartialUpdate { domain, ip, .. }) => {
                assert_eq!((domain.as_str(), ip.as_str()), ("old.example.com", "1.2.3.4"));
            }
            other => panic!("Expected PartialUpdate, got {:?}", other),
        }
        assert_eq!(
            pihole.dns_records().await,
            vec![DnsRecord::new("new.example.com", "9.9.9.9")]
        );
    }

    #[tokio::test]
    async fn queued_fault_fires_once_and_is_journaled() {
        let pihole = MemoryPihole::new();
        pihole
            .fail_next(|c| matches!(c, ApiCall::AddCname(_)), ApiError::AuthError)
            .await;

        let record = CnameRecord::new("alias.example.com", "real.example.com");
        assert!(pihole.add_custom_cname(&record).await.is_err());
        assert!(pihole.add_custom_cname(&record).await.is_ok());

        assert_eq!(pihole.calls().await.len(), 2);
        assert_eq!(pihole.cname_records().await, vec![record]);
    }
}
