//! Ledger Session
//!
//! Composes the store, index, workflow engine and disclosure gate into the
//! four user-facing operations. Caller identity and the capability challenge
//! are passed explicitly as a [`SessionContext`]; the session itself holds
//! no per-caller state and can serve many callers at once.
//!
//! # Submission order
//!
//! The record body is written before its id is appended to the index, so
//! every indexed id has a body. A crash between the two leaves an unindexed
//! body, which is invisible but harmless.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::cancel::{run_bounded, CancelToken};
use crate::config::SessionConfig;
use crate::crypto::{CapabilityChallenge, CapabilityProof, ConfidentialityCodec, SimulatedFheCodec};
use crate::disclosure::{CapabilityVerifier, ConsentVerifier, DisclosureGate};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{IndexManager, LedgerClient, RecordStore};
use crate::lifecycle::{LifecycleReporter, OperationEvent, OperationKind};
use crate::types::{Category, LedgerStats, OwnerAddress, Record, RecordDraft, RecordId, RecordStatus};
use crate::workflow::WorkflowEngine;

/// Per-caller state threaded through session operations
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: Option<OwnerAddress>,
    challenge: CapabilityChallenge,
}

impl SessionContext {
    /// Context without a connected identity, with a fresh challenge
    pub fn disconnected(config: &SessionConfig) -> Self {
        Self {
            identity: None,
            challenge: CapabilityChallenge::issue(
                config.contract_address.clone(),
                config.chain_id,
                config.window_days,
            ),
        }
    }

    /// Context for a connected identity, with a fresh challenge
    pub fn connected(identity: OwnerAddress, config: &SessionConfig) -> Self {
        Self {
            identity: Some(identity),
            ..Self::disconnected(config)
        }
    }

    /// Context with an explicit challenge (restored sessions, tests)
    pub fn with_challenge(identity: Option<OwnerAddress>, challenge: CapabilityChallenge) -> Self {
        Self { identity, challenge }
    }

    pub fn identity(&self) -> Option<&OwnerAddress> {
        self.identity.as_ref()
    }

    /// Connected identity, or `NotConnected`
    pub fn caller(&self) -> LedgerResult<&OwnerAddress> {
        self.identity.as_ref().ok_or(LedgerError::NotConnected)
    }

    pub fn challenge(&self) -> &CapabilityChallenge {
        &self.challenge
    }

    /// Replace the challenge; proofs over the old one stop working
    pub fn renew_challenge(&mut self, config: &SessionConfig) {
        self.challenge = CapabilityChallenge::issue(
            config.contract_address.clone(),
            config.chain_id,
            config.window_days,
        );
    }
}

/// User-facing ledger operations
pub struct LedgerSession {
    ledger: Arc<dyn LedgerClient>,
    store: RecordStore,
    index: IndexManager,
    workflow: WorkflowEngine,
    codec: Arc<dyn ConfidentialityCodec>,
    verifier: Arc<dyn CapabilityVerifier>,
    gate: DisclosureGate,
    reporter: LifecycleReporter,
    config: SessionConfig,
}

impl LedgerSession {
    /// Session over `ledger` with the simulated codec and consent verifier
    pub fn new(ledger: Arc<dyn LedgerClient>, config: SessionConfig) -> LedgerResult<Self> {
        config.validate()?;

        let codec: Arc<dyn ConfidentialityCodec> = Arc::new(SimulatedFheCodec::new());
        let verifier: Arc<dyn CapabilityVerifier> = Arc::new(ConsentVerifier);
        let store = RecordStore::new(ledger.clone());
        let index = IndexManager::new(ledger.clone(), config.index_config());
        let workflow = WorkflowEngine::new(store.clone())
            .with_processing_latency(config.processing_latency());
        let gate = DisclosureGate::new(codec.clone(), verifier.clone())
            .with_decrypt_latency(config.decrypt_latency());

        info!(
            backend = ledger.backend_type(),
            contract = %config.contract_address,
            chain_id = config.chain_id,
            "ledger session ready"
        );

        Ok(Self {
            ledger,
            store,
            index,
            workflow,
            codec,
            verifier,
            gate,
            reporter: LifecycleReporter::new(),
            config,
        })
    }

    /// Swap the confidentiality codec
    pub fn with_codec(mut self, codec: Arc<dyn ConfidentialityCodec>) -> Self {
        self.codec = codec;
        self.rebuild_gate();
        self
    }

    /// Swap the capability verifier
    pub fn with_verifier(mut self, verifier: Arc<dyn CapabilityVerifier>) -> Self {
        self.verifier = verifier;
        self.rebuild_gate();
        self
    }

    fn rebuild_gate(&mut self) {
        self.gate = DisclosureGate::new(self.codec.clone(), self.verifier.clone())
            .with_decrypt_latency(self.config.decrypt_latency());
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Lifecycle events of every operation on this session
    pub fn subscribe(&self) -> broadcast::Receiver<OperationEvent> {
        self.reporter.subscribe()
    }

    /// Fresh context for `identity` bound to this session's contract
    pub fn context_for(&self, identity: Option<OwnerAddress>) -> SessionContext {
        match identity {
            Some(identity) => SessionContext::connected(identity, &self.config),
            None => SessionContext::disconnected(&self.config),
        }
    }

    /// All readable records, newest first
    ///
    /// Unreadable entries are skipped and logged; they never fail the listing.
    #[instrument(skip_all)]
    pub async fn list_records(&self) -> LedgerResult<Vec<Record>> {
        self.tracked(OperationKind::List, None, self.list_inner()).await
    }

    async fn list_inner(&self) -> LedgerResult<Vec<Record>> {
        if !self.ledger.is_available().await? {
            return Err(LedgerError::LedgerUnavailable(format!(
                "{} ledger reports unavailable",
                self.ledger.backend_type()
            )));
        }

        let ids = self.index.list_ids().await?;
        let batch = self.store.get_many(&ids).await;
        if !batch.skipped.is_empty() {
            warn!(
                skipped = batch.skipped.len(),
                listed = batch.records.len(),
                "listing skipped unreadable records"
            );
        }

        let mut records = batch.records;
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    /// Seal and store a new record owned by the caller
    pub async fn submit_record(
        &self,
        ctx: &SessionContext,
        category: Category,
        payload: &[u8],
    ) -> LedgerResult<Record> {
        self.submit_record_with_cancel(ctx, category, payload, &CancelToken::new())
            .await
    }

    /// Seal and submit a draft document
    pub async fn submit_draft(&self, ctx: &SessionContext, draft: &RecordDraft) -> LedgerResult<Record> {
        let payload = draft.to_payload()?;
        self.submit_record(ctx, draft.category, &payload).await
    }

    /// `submit_record` that stops when `cancel` fires
    ///
    /// After `Cancelled` or `TimedOut` the body and index may or may not
    /// have been written; re-list before retrying.
    #[instrument(skip_all, fields(category = %category, bytes = payload.len()))]
    pub async fn submit_record_with_cancel(
        &self,
        ctx: &SessionContext,
        category: Category,
        payload: &[u8],
        cancel: &CancelToken,
    ) -> LedgerResult<Record> {
        let id = RecordId::generate();
        let work = run_bounded(
            OperationKind::Submit.as_str(),
            self.config.submit_timeout(),
            cancel,
            self.submit_inner(ctx, id.clone(), category, payload),
        );
        self.tracked(OperationKind::Submit, Some(id.as_str()), work).await
    }

    async fn submit_inner(
        &self,
        ctx: &SessionContext,
        id: RecordId,
        category: Category,
        payload: &[u8],
    ) -> LedgerResult<Record> {
        let owner = ctx.caller()?.clone();
        let sealed = self.codec.seal(payload);
        let record = Record::new(id, sealed, owner, category);

        self.store.put(&record).await?;
        let receipt = self.index.append_id(&record.id).await?;

        info!(
            record_id = %record.id,
            owner = %record.owner,
            category = %record.category,
            attempts = receipt.attempts,
            "record submitted"
        );
        Ok(record)
    }

    /// Move one of the caller's pending records to a terminal status
    #[instrument(skip_all, fields(record_id = %id, to = %target))]
    pub async fn advance_status(
        &self,
        ctx: &SessionContext,
        id: &RecordId,
        target: RecordStatus,
    ) -> LedgerResult<Record> {
        let work = async {
            let caller = ctx.caller()?;
            self.workflow.advance(id, target, caller).await
        };
        self.tracked(OperationKind::AdvanceStatus, Some(id.as_str()), work).await
    }

    /// Reveal a record's plaintext to a capability holder
    pub async fn disclose(
        &self,
        ctx: &SessionContext,
        id: &RecordId,
        proof: &CapabilityProof,
    ) -> LedgerResult<Vec<u8>> {
        self.disclose_with_cancel(ctx, id, proof, &CancelToken::new()).await
    }

    /// `disclose` that stops when `cancel` fires
    #[instrument(skip_all, fields(record_id = %id))]
    pub async fn disclose_with_cancel(
        &self,
        ctx: &SessionContext,
        id: &RecordId,
        proof: &CapabilityProof,
        cancel: &CancelToken,
    ) -> LedgerResult<Vec<u8>> {
        let inner = async {
            ctx.caller()?;
            let record = self
                .store
                .get(id)
                .await?
                .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            self.gate.request_disclosure(&record, ctx.challenge(), proof).await
        };
        let work = run_bounded(
            OperationKind::Disclose.as_str(),
            self.config.disclose_timeout(),
            cancel,
            inner,
        );
        self.tracked(OperationKind::Disclose, Some(id.as_str()), work).await
    }

    /// Counters by status and category over the current listing
    pub async fn stats(&self) -> LedgerResult<LedgerStats> {
        let records = self.list_records().await?;
        Ok(LedgerStats::from_records(&records))
    }

    /// Restore ids this session acknowledged but a stale writer dropped
    pub async fn reconcile_index(&self) -> LedgerResult<usize> {
        self.tracked(OperationKind::Reconcile, None, self.index.reconcile())
            .await
    }

    /// Restore `ids` acknowledged by an earlier session, then reconcile
    ///
    /// Every id must have a readable record body; an absent body fails with
    /// `NotFound` before anything is written. Returns how many ids were
    /// restored to the index.
    #[instrument(skip_all, fields(ids = ids.len()))]
    pub async fn reconcile_ids(&self, ids: &[RecordId]) -> LedgerResult<usize> {
        let work = async {
            for id in ids {
                if self.store.get(id).await?.is_none() {
                    return Err(LedgerError::NotFound(id.to_string()));
                }
            }
            self.index.acknowledge(ids).await;
            self.index.reconcile().await
        };
        self.tracked(OperationKind::Reconcile, None, work).await
    }

    async fn tracked<T, F>(&self, operation: OperationKind, record_id: Option<&str>, work: F) -> LedgerResult<T>
    where
        F: std::future::Future<Output = LedgerResult<T>>,
    {
        self.reporter.pending(operation, record_id);
        let result = work.await;
        match &result {
            Ok(_) => self.reporter.success(operation, record_id),
            Err(e) => {
                warn!(operation = %operation, record_id, error = %e, kind = e.kind(), "operation failed");
                self.reporter.failed(operation, record_id, e);
            }
        }
        result
    }
}
