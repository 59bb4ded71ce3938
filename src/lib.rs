//! Bridge Relayer Service Library
//!
//! This crate provides a relayer service for lock-and-mint cross-chain
//! token transfers. The relayer watches a source chain for token-lock
//! events, waits for sufficient confirmation depth, obtains an external
//! attestation, submits the mint instruction to the destination chain, and
//! tracks each transfer through a bounded lifecycle until it completes or
//! permanently fails.

pub mod api;
pub mod attestation;
pub mod config;
pub mod evm_client;
pub mod ledger;
pub mod relayer;
pub mod scanner;

// Re-export commonly used types
pub use config::{ApiConfig, ChainEndpointConfig, Config, RelayerConfig};
pub use ledger::{CrossChainTransaction, LockEvent, TransactionLedger, TransactionStatus};
pub use relayer::{ChainReadError, ChainReader, RelayOrchestrator, Submitter, ValidationClient};
pub use scanner::EventWindowScanner;
