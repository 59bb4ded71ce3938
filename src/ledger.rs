//! Transaction Ledger Module
//!
//! This module holds the cross-chain transaction entity and the in-memory
//! store that owns transaction lifecycle state. The ledger is process-wide
//! state: it is created at startup and lost on restart. There is no
//! persisted transaction log.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Lifecycle status of a cross-chain transaction.
///
/// Transitions only move forward along the relay state machine; a status
/// never regresses. `Completed` and `Failed` are terminal. The serialized
/// form is the stable SCREAMING_SNAKE_CASE string exposed in logs and the
/// status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Lock event detected on the source chain
    Initiated,
    /// Reached the required confirmation depth on the source chain
    ConfirmedSource,
    /// Attestation obtained, ready to submit to the destination chain
    RelayPending,
    /// Mint instruction accepted by the destination chain
    Relayed,
    /// Relay finished successfully
    Completed,
    /// Permanently failed after exhausting submission attempts
    Failed,
}

impl TransactionStatus {
    /// Returns true for terminal states (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Initiated => "INITIATED",
            TransactionStatus::ConfirmedSource => "CONFIRMED_SOURCE",
            TransactionStatus::RelayPending => "RELAY_PENDING",
            TransactionStatus::Relayed => "RELAYED",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// A token-lock event observed on the source chain.
///
/// This is the raw record returned by the chain reader before it is turned
/// into a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockEvent {
    /// Address that locked the tokens (0x-prefixed hex)
    pub sender: String,
    /// Address of the locked token contract (0x-prefixed hex)
    pub token: String,
    /// Locked amount (uint256; must not truncate above 64 bits)
    pub amount: U256,
    /// Identifier of the target ledger
    pub destination_chain_id: u64,
    /// Hash of the source transaction that emitted the event (unique key)
    pub source_tx_hash: String,
    /// Height at which the lock event was observed
    pub source_block_number: u64,
}

/// State and details of a single cross-chain transaction.
///
/// One entry exists per distinct source-chain lock event, keyed by the
/// source transaction hash. `id` and `source_block_number` are immutable
/// after creation; `status` only moves forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossChainTransaction {
    /// Source transaction hash (unique key, immutable)
    pub id: String,
    /// Current lifecycle status
    pub status: TransactionStatus,
    /// Address that locked the tokens on the source chain
    pub sender: String,
    /// Address of the locked token contract
    pub token: String,
    /// Locked amount (uint256)
    pub amount: U256,
    /// Identifier of the target ledger
    pub destination_chain_id: u64,
    /// Height at which the lock event was observed (immutable)
    pub source_block_number: u64,
    /// Destination transaction hash, set once the mint is accepted
    pub destination_tx_hash: Option<String>,
    /// Reason recorded when a submission attempt errors
    pub failure_reason: Option<String>,
    /// Number of submission attempts made so far (only increases)
    pub attempts: u32,
    /// Unix timestamp of ingestion; drives retention-based eviction
    pub created_at: u64,
}

impl CrossChainTransaction {
    /// Creates a new transaction entry from an observed lock event.
    ///
    /// The entry starts in `Initiated` status with no attempts recorded.
    pub fn from_event(event: &LockEvent, created_at: u64) -> Self {
        Self {
            id: event.source_tx_hash.clone(),
            status: TransactionStatus::Initiated,
            sender: event.sender.clone(),
            token: event.token.clone(),
            amount: event.amount,
            destination_chain_id: event.destination_chain_id,
            source_block_number: event.source_block_number,
            destination_tx_hash: None,
            failure_reason: None,
            attempts: 0,
            created_at,
        }
    }
}

// ============================================================================
// LEDGER IMPLEMENTATION
// ============================================================================

/// In-memory store of cross-chain transactions keyed by source tx hash.
///
/// The ledger is mutated exclusively by the orchestrator's single per-cycle
/// pass; the status API only reads snapshots. Terminal entries are retained
/// for a fixed window and then evicted.
#[derive(Debug, Default)]
pub struct TransactionLedger {
    /// Map of source tx hash -> transaction
    entries: HashMap<String, CrossChainTransaction>,
}

impl TransactionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Ingests a lock event, creating a new `Initiated` entry.
    ///
    /// Idempotent under duplicate delivery: re-observing a source tx hash
    /// already present in the ledger is a no-op.
    ///
    /// # Returns
    ///
    /// * `true` - A new entry was created
    /// * `false` - The event was already known
    pub fn ingest(&mut self, event: &LockEvent, now: u64) -> bool {
        if self.entries.contains_key(&event.source_tx_hash) {
            return false;
        }
        let tx = CrossChainTransaction::from_event(event, now);
        self.entries.insert(tx.id.clone(), tx);
        true
    }

    /// Inserts a fully formed transaction unconditionally, replacing any
    /// existing entry with the same id.
    #[allow(dead_code)]
    pub fn insert(&mut self, tx: CrossChainTransaction) {
        self.entries.insert(tx.id.clone(), tx);
    }

    /// Looks up a transaction by source tx hash.
    pub fn get(&self, id: &str) -> Option<&CrossChainTransaction> {
        self.entries.get(id)
    }

    /// Looks up a transaction by source tx hash for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut CrossChainTransaction> {
        self.entries.get_mut(id)
    }

    /// Number of entries currently held (including terminal ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Takes a stable snapshot of all entry ids.
    ///
    /// The advancing pass iterates over this snapshot rather than the live
    /// map, since terminal entries may be evicted in the same cycle.
    pub fn snapshot_ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns a copy of all transactions, for the status API.
    pub fn transactions(&self) -> Vec<CrossChainTransaction> {
        self.entries.values().cloned().collect()
    }

    /// Evicts terminal entries older than the retention window.
    ///
    /// Only `Completed` and `Failed` entries are eligible; active entries
    /// are never removed regardless of age.
    ///
    /// # Returns
    ///
    /// Number of entries removed.
    pub fn evict_expired(&mut self, now: u64, retention_secs: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, tx| {
            !(tx.status.is_terminal() && now.saturating_sub(tx.created_at) > retention_secs)
        });
        before - self.entries.len()
    }
}

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
