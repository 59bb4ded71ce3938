//! Relay Orchestrator Module
//!
//! This module defines the collaborator contracts (chain reader, validation
//! client, mint submitter) and the orchestrator that drives each cross-chain
//! transaction through its lifecycle. One polling cycle performs exactly one
//! ingestion pass followed by one state-advancing pass; each transaction
//! advances at most one transition per cycle. This throttling is deliberate:
//! it bounds per-cycle work and keeps external-call volume predictable.

use anyhow::{Context, Result};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::ledger::{current_timestamp, LockEvent, TransactionLedger, TransactionStatus};
use crate::scanner::EventWindowScanner;

// ============================================================================
// COLLABORATOR CONTRACTS
// ============================================================================

/// Error returned by a chain reader.
///
/// `RangeUnavailable` is the transient condition raised when the node has
/// not yet synced the requested block range; the scanner treats it as an
/// empty result for the cycle rather than a failure.
#[derive(Debug, Error)]
pub enum ChainReadError {
    /// Requested block range is not available yet (node still syncing)
    #[error("block range unavailable: {0}")]
    RangeUnavailable(String),
    /// The node returned a JSON-RPC error
    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i32, message: String },
    /// The request could not be sent or the response could not be read
    #[error("transport error: {0}")]
    Transport(String),
    /// The node returned a response the client could not decode
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Read access to the source ledger: head height and lock-event records.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Returns the current head block height.
    async fn head_block(&self) -> Result<u64, ChainReadError>;

    /// Returns lock events emitted in the inclusive block range
    /// `[from_block, to_block]`, ordered by source block number.
    async fn lock_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LockEvent>, ChainReadError>;
}

/// External attestation round-trip authorizing a mint on the destination
/// ledger. Failure is never fatal to the orchestrator; the call is retried
/// on the next cycle indefinitely.
#[async_trait]
pub trait ValidationClient: Send + Sync {
    /// Requests an attestation for the given source transaction.
    async fn attest(&self, source_tx_hash: &str) -> Result<()>;
}

/// Submission of the mint instruction to the destination ledger.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submits a mint crediting `amount` to `recipient`, tagged with the
    /// source transaction hash.
    ///
    /// # Returns
    ///
    /// The destination transaction hash on acceptance.
    async fn submit_mint(
        &self,
        recipient: &str,
        amount: U256,
        source_tx_hash: &str,
    ) -> Result<String>;
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Drives cross-chain transactions through the relay state machine.
///
/// The orchestrator owns the scan watermark and shares the transaction
/// ledger with the status API. Processing within a cycle is strictly
/// serial: the "one transition per entry per cycle" throttle stays correct
/// and the shared ledger needs no per-entry locking.
pub struct RelayOrchestrator<R, V, S>
where
    R: ChainReader,
    V: ValidationClient,
    S: Submitter,
{
    /// Service configuration
    config: Arc<Config>,
    /// Source chain reader
    reader: R,
    /// Attestation client
    validator: V,
    /// Destination chain submitter
    submitter: S,
    /// Bounded-window event scanner (owns the watermark)
    scanner: EventWindowScanner,
    /// Shared transaction ledger
    ledger: Arc<RwLock<TransactionLedger>>,
}

impl<R, V, S> RelayOrchestrator<R, V, S>
where
    R: ChainReader,
    V: ValidationClient,
    S: Submitter,
{
    /// Creates a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `config` - Service configuration
    /// * `reader` - Source chain reader
    /// * `validator` - Attestation client
    /// * `submitter` - Destination chain submitter
    /// * `ledger` - Shared transaction ledger
    /// * `start_block` - Initial scan watermark (scanning begins at the
    ///   next block)
    pub fn new(
        config: Arc<Config>,
        reader: R,
        validator: V,
        submitter: S,
        ledger: Arc<RwLock<TransactionLedger>>,
        start_block: u64,
    ) -> Self {
        let scanner = EventWindowScanner::new(config.relayer.scan_window, start_block);
        Self {
            config,
            reader,
            validator,
            submitter,
            scanner,
            ledger,
        }
    }

    /// Current scan watermark (last block already scanned).
    #[allow(dead_code)]
    pub fn last_scanned_block(&self) -> u64 {
        self.scanner.last_scanned_block()
    }

    /// Runs the polling loop until the task is cancelled.
    ///
    /// A cycle always runs to completion; cycle errors are logged and the
    /// loop continues after the configured inter-cycle delay.
    pub async fn run(&mut self) {
        let mut cycle = 0u64;
        loop {
            cycle += 1;
            info!("Starting relay cycle #{}", cycle);
            if let Err(e) = self.run_cycle().await {
                error!("Relay cycle #{} failed: {:#}", cycle, e);
            }
            tokio::time::sleep(std::time::Duration::from_millis(
                self.config.relayer.cycle_interval_ms,
            ))
            .await;
        }
    }

    /// Executes one full relay cycle: ingestion, state advancement, and
    /// eviction of expired terminal entries.
    pub async fn run_cycle(&mut self) -> Result<()> {
        let head_block = self
            .reader
            .head_block()
            .await
            .context("Failed to get source chain head block")?;

        self.ingest_new_events(head_block).await;
        self.advance_transactions(head_block).await;

        let now = current_timestamp();
        let mut ledger = self.ledger.write().await;
        let evicted = ledger.evict_expired(now, self.config.relayer.retention_secs);
        if evicted > 0 {
            info!("Evicted {} expired terminal transaction(s)", evicted);
        }
        info!("Cycle finished. Active transactions: {}", ledger.len());

        Ok(())
    }

    /// Scans the source chain for new lock events and ingests them.
    ///
    /// Ingestion is idempotent: re-observing a known source tx hash is a
    /// no-op.
    async fn ingest_new_events(&mut self, head_block: u64) {
        let events = self.scanner.scan(&self.reader, head_block).await;
        if events.is_empty() {
            return;
        }

        let now = current_timestamp();
        let mut ledger = self.ledger.write().await;
        for event in &events {
            if ledger.ingest(event, now) {
                info!(
                    "New transaction detected: {} (amount={}, destination chain {})",
                    event.source_tx_hash, event.amount, event.destination_chain_id
                );
            }
        }
    }

    /// Advances every active transaction by at most one transition.
    ///
    /// The pass iterates over a stable snapshot of ledger ids taken at the
    /// start; an error while advancing one transaction never aborts
    /// processing of the others.
    async fn advance_transactions(&self, head_block: u64) {
        let ids = {
            let ledger = self.ledger.read().await;
            if ledger.is_empty() {
                info!("No active transactions to process");
                return;
            }
            ledger.snapshot_ids()
        };

        for id in ids {
            let status = {
                let ledger = self.ledger.read().await;
                match ledger.get(&id) {
                    Some(tx) => tx.status,
                    None => continue,
                }
            };
            debug!("Processing transaction {} with status {}", id, status);

            match status {
                TransactionStatus::Initiated => {
                    self.handle_initiated(&id, head_block).await;
                }
                TransactionStatus::ConfirmedSource => {
                    self.handle_confirmed(&id).await;
                }
                TransactionStatus::RelayPending => {
                    self.handle_relay(&id).await;
                }
                // Terminal states are never mutated further; eviction is
                // handled separately against the live store.
                TransactionStatus::Relayed
                | TransactionStatus::Completed
                | TransactionStatus::Failed => {}
            }
        }
    }

    /// Checks confirmation depth for an `Initiated` transaction.
    ///
    /// Pure comparison against the shared head height; no external call.
    async fn handle_initiated(&self, id: &str, head_block: u64) {
        let required = self.config.relayer.required_confirmations;
        let mut ledger = self.ledger.write().await;
        let tx = match ledger.get_mut(id) {
            Some(tx) => tx,
            None => return,
        };
        let confirmations = head_block.saturating_sub(tx.source_block_number);
        if confirmations >= required {
            info!(
                "Transaction {} reached {} confirmation(s). Updating status",
                id, confirmations
            );
            tx.status = TransactionStatus::ConfirmedSource;
        } else {
            debug!(
                "Transaction {} waiting for confirmations ({}/{})",
                id, confirmations, required
            );
        }
    }

    /// Performs the attestation handshake for a `ConfirmedSource`
    /// transaction.
    ///
    /// Attestation failure is transient: it is logged and retried on the
    /// next cycle with no backoff and no attempt cap.
    async fn handle_confirmed(&self, id: &str) {
        match self.validator.attest(id).await {
            Ok(()) => {
                let mut ledger = self.ledger.write().await;
                if let Some(tx) = ledger.get_mut(id) {
                    info!("Attestation obtained for {}", id);
                    tx.status = TransactionStatus::RelayPending;
                }
            }
            Err(e) => {
                warn!("Attestation failed for {}: {:#}. Retrying later", id, e);
            }
        }
    }

    /// Submits the mint instruction for a `RelayPending` transaction.
    ///
    /// The attempt counter is incremented before the call. On acceptance
    /// the entry passes through `Relayed` and is recorded `Completed` in
    /// the same step; there is no separate destination-confirmation wait.
    /// On error the failure reason is recorded and the transaction moves to
    /// `Failed` once the attempt cap is exceeded.
    async fn handle_relay(&self, id: &str) {
        let (recipient, amount, attempts) = {
            let mut ledger = self.ledger.write().await;
            let tx = match ledger.get_mut(id) {
                Some(tx) => tx,
                None => return,
            };
            tx.attempts += 1;
            info!(
                "Relaying transaction {} to destination chain {} (attempt {})",
                id, tx.destination_chain_id, tx.attempts
            );
            (tx.sender.clone(), tx.amount, tx.attempts)
        };

        match self.submitter.submit_mint(&recipient, amount, id).await {
            Ok(destination_tx_hash) => {
                let mut ledger = self.ledger.write().await;
                if let Some(tx) = ledger.get_mut(id) {
                    tx.destination_tx_hash = Some(destination_tx_hash.clone());
                    tx.status = TransactionStatus::Relayed;
                    info!(
                        "Transaction {} relayed to destination chain. Destination tx hash: {}",
                        id, destination_tx_hash
                    );
                    tx.status = TransactionStatus::Completed;
                    info!("Bridge completed for {}", id);
                }
            }
            Err(e) => {
                let mut ledger = self.ledger.write().await;
                if let Some(tx) = ledger.get_mut(id) {
                    error!("Failed to relay transaction {}: {:#}", id, e);
                    tx.failure_reason = Some(format!("{:#}", e));
                    if attempts > self.config.relayer.max_submission_attempts {
                        error!(
                            "Transaction {} failed after {} attempts. Marking as FAILED",
                            id, attempts
                        );
                        tx.status = TransactionStatus::Failed;
                    }
                }
            }
        }
    }
}
