//! Unit tests for configuration parsing and validation
//!
//! These tests verify TOML parsing, serde defaults for the relayer
//! tunables, and the validation rules.

use bridge_relayer::config::Config;

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::build_test_config;

/// Minimal TOML with every relayer tunable omitted
const MINIMAL_CONFIG: &str = r#"
[source_chain]
name = "Source"
rpc_url = "http://127.0.0.1:8545"
chain_id = 1
bridge_contract_addr = "0x00000000000000000000000000000000000000c3"

[destination_chain]
name = "Destination"
rpc_url = "http://127.0.0.1:8546"
chain_id = 2
bridge_contract_addr = "0x00000000000000000000000000000000000000c4"

[relayer]
attestation_url = "http://127.0.0.1:9999/signature"

[api]
host = "127.0.0.1"
port = 3434
"#;

/// Test that omitted relayer tunables take the documented defaults
/// What is tested: confirmations 12, window 100, attempts 5, retention
/// 3600s, cycle interval 15s, attestation timeout 5s
#[test]
fn test_relayer_defaults() {
    let config: Config = toml::from_str(MINIMAL_CONFIG).expect("minimal config should parse");
    config.validate().expect("minimal config should validate");

    assert_eq!(config.relayer.required_confirmations, 12);
    assert_eq!(config.relayer.scan_window, 100);
    assert_eq!(config.relayer.max_submission_attempts, 5);
    assert_eq!(config.relayer.retention_secs, 3600);
    assert_eq!(config.relayer.cycle_interval_ms, 15_000);
    assert_eq!(config.relayer.attestation_timeout_ms, 5_000);
}

/// Test that explicit tunables override the defaults
#[test]
fn test_explicit_tunables_override_defaults() {
    let toml_str = MINIMAL_CONFIG.replace(
        "attestation_url = \"http://127.0.0.1:9999/signature\"",
        "attestation_url = \"http://127.0.0.1:9999/signature\"\n\
         required_confirmations = 6\n\
         scan_window = 50\n\
         max_submission_attempts = 3\n\
         retention_secs = 600\n\
         cycle_interval_ms = 1000",
    );
    let config: Config = toml::from_str(&toml_str).unwrap();

    assert_eq!(config.relayer.required_confirmations, 6);
    assert_eq!(config.relayer.scan_window, 50);
    assert_eq!(config.relayer.max_submission_attempts, 3);
    assert_eq!(config.relayer.retention_secs, 600);
    assert_eq!(config.relayer.cycle_interval_ms, 1000);
}

/// Test that identical source and destination chain ids fail validation
/// Why: Relaying a chain onto itself is always a configuration mistake
#[test]
fn test_duplicate_chain_ids_rejected() {
    let mut config = build_test_config();
    config.destination_chain.chain_id = config.source_chain.chain_id;
    assert!(config.validate().is_err());
}

/// Test bridge contract address validation
/// What is tested: missing 0x prefix, non-hex payload, and wrong byte
/// length are all rejected
#[test]
fn test_invalid_bridge_addresses_rejected() {
    for bad_addr in [
        "00000000000000000000000000000000000000c3", // no 0x prefix
        "0xnothexnothexnothexnothexnothexnothexnoth", // not hex
        "0x00c3",                                   // wrong length
    ] {
        let mut config = build_test_config();
        config.source_chain.bridge_contract_addr = bad_addr.to_string();
        assert!(
            config.validate().is_err(),
            "address {:?} should be rejected",
            bad_addr
        );
    }
}

/// Test that zero-valued window and cycle interval are rejected
#[test]
fn test_zero_tunables_rejected() {
    let mut config = build_test_config();
    config.relayer.scan_window = 0;
    assert!(config.validate().is_err());

    let mut config = build_test_config();
    config.relayer.cycle_interval_ms = 0;
    assert!(config.validate().is_err());
}

/// Test that a fully specified valid config passes validation
#[test]
fn test_valid_config_accepted() {
    assert!(build_test_config().validate().is_ok());
}
