//! Shared test helpers for unit tests
//!
//! This module provides helper functions used by unit tests.
//!
//! The module is organized into several categories:
//! - **Constants**: Dummy hashes, addresses, and chain ids
//! - **Configuration Builders**: Functions to create test configurations
//! - **Event Builders**: Functions to create default lock events
//! - **Fake Collaborators**: In-process ChainReader/ValidationClient/Submitter
//!   implementations with scriptable behavior and call recording

use anyhow::Result;
use async_trait::async_trait;
use primitive_types::U256;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bridge_relayer::config::{ApiConfig, ChainEndpointConfig, Config, RelayerConfig};
use bridge_relayer::ledger::LockEvent;
use bridge_relayer::relayer::{ChainReadError, ChainReader, Submitter, ValidationClient};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy source transaction hash (32 bytes)
pub const DUMMY_SOURCE_TX_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";

/// Second dummy source transaction hash (32 bytes)
#[allow(dead_code)]
pub const DUMMY_SOURCE_TX_HASH_2: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000002";

/// Dummy destination transaction hash (32 bytes)
#[allow(dead_code)]
pub const DUMMY_DEST_TX_HASH: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000aa";

/// Dummy sender address (EVM format, 20 bytes)
pub const DUMMY_SENDER_ADDR: &str = "0x00000000000000000000000000000000000000a1";

/// Dummy token contract address (EVM format, 20 bytes)
pub const DUMMY_TOKEN_ADDR: &str = "0x00000000000000000000000000000000000000b2";

/// Dummy bridge contract address (EVM format, 20 bytes)
pub const DUMMY_BRIDGE_CONTRACT_ADDR: &str = "0x00000000000000000000000000000000000000c3";

/// Destination chain id used throughout the tests
pub const DUMMY_DESTINATION_CHAIN_ID: u64 = 17000;

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Builds a relayer configuration with the documented defaults and local
/// endpoints, except for a short cycle interval.
pub fn build_test_config() -> Config {
    Config {
        source_chain: ChainEndpointConfig {
            name: "Source Test Chain".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 11155111,
            bridge_contract_addr: DUMMY_BRIDGE_CONTRACT_ADDR.to_string(),
        },
        destination_chain: ChainEndpointConfig {
            name: "Destination Test Chain".to_string(),
            rpc_url: "http://127.0.0.1:8546".to_string(),
            chain_id: DUMMY_DESTINATION_CHAIN_ID,
            bridge_contract_addr: DUMMY_BRIDGE_CONTRACT_ADDR.to_string(),
        },
        relayer: RelayerConfig {
            required_confirmations: 12,
            scan_window: 100,
            max_submission_attempts: 5,
            retention_secs: 3600,
            cycle_interval_ms: 10,
            attestation_url: "http://127.0.0.1:9999/signature".to_string(),
            attestation_timeout_ms: 5000,
        },
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3434,
        },
    }
}

// ============================================================================
// EVENT BUILDERS
// ============================================================================

/// Creates a default lock event at the given block.
pub fn create_lock_event(source_tx_hash: &str, source_block_number: u64) -> LockEvent {
    LockEvent {
        sender: DUMMY_SENDER_ADDR.to_string(),
        token: DUMMY_TOKEN_ADDR.to_string(),
        amount: U256::from(1_000_000u64),
        destination_chain_id: DUMMY_DESTINATION_CHAIN_ID,
        source_tx_hash: source_tx_hash.to_string(),
        source_block_number,
    }
}

// ============================================================================
// FAKE COLLABORATORS
// ============================================================================

#[derive(Default)]
struct ReaderState {
    head: u64,
    events: Vec<LockEvent>,
    range_unavailable: bool,
    queried_ranges: Vec<(u64, u64)>,
}

/// Scriptable in-process chain reader.
///
/// Clones share state, so tests can keep a handle and adjust the head or
/// the pending events between cycles while the orchestrator owns a clone.
#[derive(Clone, Default)]
pub struct FakeChainReader {
    inner: Arc<Mutex<ReaderState>>,
}

impl FakeChainReader {
    pub fn new(head: u64) -> Self {
        let reader = Self::default();
        reader.set_head(head);
        reader
    }

    /// Sets the head block height returned by `head_block`.
    pub fn set_head(&self, head: u64) {
        self.inner.lock().unwrap().head = head;
    }

    /// Adds a lock event to be returned by range queries covering its block.
    pub fn push_event(&self, event: LockEvent) {
        self.inner.lock().unwrap().events.push(event);
    }

    /// Makes subsequent range queries fail with the transient condition.
    pub fn set_range_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().range_unavailable = unavailable;
    }

    /// All `(from, to)` ranges queried so far.
    pub fn queried_ranges(&self) -> Vec<(u64, u64)> {
        self.inner.lock().unwrap().queried_ranges.clone()
    }
}

#[async_trait]
impl ChainReader for FakeChainReader {
    async fn head_block(&self) -> Result<u64, ChainReadError> {
        Ok(self.inner.lock().unwrap().head)
    }

    async fn lock_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LockEvent>, ChainReadError> {
        let mut state = self.inner.lock().unwrap();
        state.queried_ranges.push((from_block, to_block));
        if state.range_unavailable {
            return Err(ChainReadError::RangeUnavailable(
                "node still syncing".to_string(),
            ));
        }
        let mut events: Vec<LockEvent> = state
            .events
            .iter()
            .filter(|event| {
                event.source_block_number >= from_block && event.source_block_number <= to_block
            })
            .cloned()
            .collect();
        events.sort_by_key(|event| event.source_block_number);
        Ok(events)
    }
}

#[derive(Default)]
struct ValidatorState {
    succeed: bool,
    calls: u32,
}

/// Scriptable in-process attestation client.
#[derive(Clone, Default)]
pub struct FakeValidator {
    inner: Arc<Mutex<ValidatorState>>,
}

impl FakeValidator {
    pub fn new(succeed: bool) -> Self {
        let validator = Self::default();
        validator.set_succeed(succeed);
        validator
    }

    pub fn set_succeed(&self, succeed: bool) {
        self.inner.lock().unwrap().succeed = succeed;
    }

    /// Number of attestation calls made so far.
    pub fn calls(&self) -> u32 {
        self.inner.lock().unwrap().calls
    }
}

#[async_trait]
impl ValidationClient for FakeValidator {
    async fn attest(&self, _source_tx_hash: &str) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.calls += 1;
        if state.succeed {
            Ok(())
        } else {
            Err(anyhow::anyhow!("attestation service unreachable"))
        }
    }
}

#[derive(Default)]
struct SubmitterState {
    responses: VecDeque<Result<String, String>>,
    calls: u32,
}

/// Scriptable in-process mint submitter.
///
/// Responses are consumed in order; once exhausted, every further call
/// succeeds with a derived destination hash.
#[derive(Clone, Default)]
pub struct FakeSubmitter {
    inner: Arc<Mutex<SubmitterState>>,
}

impl FakeSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful submission returning the given destination hash.
    #[allow(dead_code)]
    pub fn push_success(&self, destination_tx_hash: &str) {
        self.inner
            .lock()
            .unwrap()
            .responses
            .push_back(Ok(destination_tx_hash.to_string()));
    }

    /// Queues `count` failing submissions.
    pub fn push_failures(&self, count: usize) {
        let mut state = self.inner.lock().unwrap();
        for _ in 0..count {
            state
                .responses
                .push_back(Err("destination node rejected the transaction".to_string()));
        }
    }

    /// Number of submission calls made so far.
    pub fn calls(&self) -> u32 {
        self.inner.lock().unwrap().calls
    }
}

#[async_trait]
impl Submitter for FakeSubmitter {
    async fn submit_mint(
        &self,
        _recipient: &str,
        _amount: U256,
        source_tx_hash: &str,
    ) -> Result<String> {
        let mut state = self.inner.lock().unwrap();
        state.calls += 1;
        match state.responses.pop_front() {
            Some(Ok(hash)) => Ok(hash),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Ok(format!("0xdest{}", source_tx_hash.trim_start_matches("0x"))),
        }
    }
}
