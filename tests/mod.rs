//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    build_test_config, create_lock_event, FakeChainReader, FakeSubmitter, FakeValidator,
    DUMMY_BRIDGE_CONTRACT_ADDR, DUMMY_DESTINATION_CHAIN_ID, DUMMY_DEST_TX_HASH,
    DUMMY_SENDER_ADDR, DUMMY_SOURCE_TX_HASH, DUMMY_SOURCE_TX_HASH_2, DUMMY_TOKEN_ADDR,
};
