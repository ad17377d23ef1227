use super::*;
use crate::api::{ApiCall, ApiError, CnameRecord, MemoryPihole};
use std::sync::Arc;

fn reconciler(pihole: &MemoryPihole) -> CnameReconciler {
    CnameReconciler::new(Arc::new(pihole.clone()))
}

#[tokio::test]
async fn create_then_read_matches_server() {
    let pihole = MemoryPihole::new();
    let cname = reconciler(&pihole);

    let created = cname
        .create(&CnameRecord::new("alias.example.com", "real.example.com"))
        .await
        .unwrap();
    assert!(!created.last_updated.is_empty());

    let read = cname.read("alias.example.com").await.unwrap().unwrap();
    assert_eq!(read.record(), created.record());
}

#[tokio::test]
async fn read_reflects_server_normalization() {
    let pihole = MemoryPihole::new();
    let cname = reconciler(&pihole);

    cname
        .create(&CnameRecord::new("Alias.Example.com", "Real.Example.com"))
        .await
        .unwrap();
    let read = cname.read("Alias.Example.com").await.unwrap().unwrap();

    assert_eq!(read.domain, "alias.example.com");
    assert_eq!(read.target, "real.example.com");
}

#[tokio::test]
async fn read_of_missing_alias_is_not_found() {
    let pihole = MemoryPihole::new();
    let cname = reconciler(&pihole);

    assert!(cname.read("alias.example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn create_failure_leaves_no_record() {
    let pihole = MemoryPihole::new();
    pihole
        .fail_next(|c| matches!(c, ApiCall::AddCname(_)), ApiError::AuthError)
        .await;
    let cname = reconciler(&pihole);

    let error = cname
        .create(&CnameRecord::new("alias.example.com", "real.example.com"))
        .await
        .unwrap_err();

    assert_eq!(error.operation(), Operation::Create);
    assert!(pihole.cname_records().await.is_empty());
}

#[tokio::test]
async fn delete_sends_the_full_pair() {
    let pihole = MemoryPihole::new();
    pihole.insert_cname("alias.example.com", "real.example.com").await;
    let cname = reconciler(&pihole);

    let record = CnameRecord::new("alias.example.com", "real.example.com");
    cname.delete(&record).await.unwrap();

    assert_eq!(pihole.calls().await, vec![ApiCall::DeleteCname(record)]);
    assert!(cname.read("alias.example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_with_stale_target_is_an_error() {
    let pihole = MemoryPihole::new();
    pihole.insert_cname("alias.example.com", "other.example.com").await;
    let cname = reconciler(&pihole);

    let error = cname
        .delete(&CnameRecord::new("alias.example.com", "real.example.com"))
        .await
        .unwrap_err();

    match error {
        ReconcileError::Remote {
            kind: RecordKind::Cname,
            operation: Operation::Delete,
            ..
        } => {}
        other => panic!("Expected Remote delete error, got {:?}", other),
    }
}

#[test]
fn import_passes_the_domain_through() {
    let cname = reconciler(&MemoryPihole::new());
    assert_eq!(cname.import("alias.example.com"), "alias.example.com");
}
