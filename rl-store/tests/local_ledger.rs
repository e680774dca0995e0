//! Several clients sharing one local ledger directory

use std::sync::Arc;
use tempfile::TempDir;

use rl_core::{
    Category, IndexConfig, IndexManager, LedgerSession, OwnerAddress, RecordId, SessionConfig,
};
use rl_store::LocalLedger;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clients_sharing_a_directory_keep_every_id() {
    const CLIENTS: usize = 6;
    let dir = TempDir::new().unwrap();
    let config = SessionConfig {
        index_append_retries: 40,
        index_confirmations: 2,
        confirmation_interval_ms: 2,
        ..SessionConfig::immediate()
    };

    let mut handles = Vec::new();
    for n in 0..CLIENTS {
        // Each client opens the directory itself, like separate processes would.
        let ledger = Arc::new(LocalLedger::new(dir.path()).await.unwrap());
        let session = Arc::new(LedgerSession::new(ledger, config.clone()).unwrap());
        handles.push(tokio::spawn(async move {
            let ctx = session.context_for(Some(OwnerAddress::new(format!("0x{}", n))));
            let record = session
                .submit_record(&ctx, Category::Paper, format!("doc-{}", n).as_bytes())
                .await;
            (session, record)
        }));
    }

    let mut sessions = Vec::new();
    let mut acknowledged: Vec<RecordId> = Vec::new();
    for handle in handles {
        let (session, record) = handle.await.unwrap();
        if let Ok(record) = record {
            acknowledged.push(record.id);
        }
        sessions.push(session);
    }
    assert!(!acknowledged.is_empty());

    for session in &sessions {
        session.reconcile_index().await.unwrap();
    }

    let observer_ledger = Arc::new(LocalLedger::new(dir.path()).await.unwrap());
    let observer = IndexManager::new(observer_ledger, IndexConfig::default());
    let ids = observer.list_ids().await.unwrap();
    for id in &acknowledged {
        assert!(ids.contains(id), "acknowledged id {id} missing");
    }
}

#[tokio::test]
async fn corrupt_file_is_skipped_in_listing() {
    let dir = TempDir::new().unwrap();
    let ledger = Arc::new(LocalLedger::new(dir.path()).await.unwrap());
    let session = LedgerSession::new(ledger, SessionConfig::immediate()).unwrap();
    let ctx = session.context_for(Some(OwnerAddress::new("0xA")));

    let mut ids = Vec::new();
    for category in [Category::Glass, Category::Metal, Category::Organic] {
        ids.push(session.submit_record(&ctx, category, b"x").await.unwrap().id);
    }
    let victim = dir.path().join(format!("record_{}.val", ids[0]));
    tokio::fs::write(&victim, b"\xde\xad\xbe\xef").await.unwrap();

    let listed = session.list_records().await.unwrap();
    assert_eq!(listed.len(), 2);
}
