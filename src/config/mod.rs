//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the relayer
//! service. Configuration includes chain endpoints, bridge contract
//! addresses, relay tuning parameters, and API settings.

use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
///
/// This structure holds configuration for:
/// - Source chain connection details (where lock events are watched)
/// - Destination chain connection details (where mints are submitted)
/// - Relayer tuning parameters (confirmations, window, retries, retention)
/// - API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source chain configuration (lock events originate here)
    pub source_chain: ChainEndpointConfig,
    /// Destination chain configuration (mints are submitted here)
    pub destination_chain: ChainEndpointConfig,
    /// Relayer-specific configuration (timing and retry settings)
    pub relayer: RelayerConfig,
    /// API server configuration (host, port)
    pub api: ApiConfig,
}

/// Configuration for a blockchain connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEndpointConfig {
    /// Human-readable name for the chain
    pub name: String,
    /// RPC endpoint URL for blockchain communication
    pub rpc_url: String,
    /// Unique chain identifier
    pub chain_id: u64,
    /// Address of the bridge contract on this chain (0x-prefixed, 20 bytes)
    pub bridge_contract_addr: String,
}

/// Relayer-specific configuration for confirmation, scanning, retry, and
/// retention behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerConfig {
    /// Confirmation depth required on the source chain before relaying
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: u64,
    /// Maximum number of blocks covered by a single event scan
    #[serde(default = "default_scan_window")]
    pub scan_window: u64,
    /// Submission attempt cap; exceeding it marks a transaction FAILED
    #[serde(default = "default_max_submission_attempts")]
    pub max_submission_attempts: u32,
    /// How long terminal transactions are retained before eviction, in seconds
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// Delay between polling cycles in milliseconds
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,
    /// URL of the external attestation service
    pub attestation_url: String,
    /// Timeout for the attestation round-trip in milliseconds
    #[serde(default = "default_attestation_timeout_ms")]
    pub attestation_timeout_ms: u64,
}

/// API server configuration for the read-only status endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
}

// ============================================================================
// DEFAULTS
// ============================================================================

fn default_required_confirmations() -> u64 {
    12
}

fn default_scan_window() -> u64 {
    100
}

fn default_max_submission_attempts() -> u32 {
    5
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_cycle_interval_ms() -> u64 {
    15_000
}

fn default_attestation_timeout_ms() -> u64 {
    5_000
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from the TOML file.
    ///
    /// The path defaults to `config/relayer.toml` and can be overridden via
    /// the `RELAYER_CONFIG_PATH` environment variable.
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded and validated configuration
    /// - `Err(anyhow::Error)` - File missing, unparsable, or invalid
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("RELAYER_CONFIG_PATH")
            .unwrap_or_else(|_| "config/relayer.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/relayer.template.toml config/relayer.toml\n\
                Then edit config/relayer.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Validates the configuration.
    ///
    /// This function ensures that:
    /// - Source and destination chain IDs differ
    /// - Bridge contract addresses are well-formed 20-byte hex addresses
    /// - The scan window and cycle interval are non-zero
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Configuration is valid
    /// - `Err(anyhow::Error)` - Validation failed
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source_chain.chain_id == self.destination_chain.chain_id {
            return Err(anyhow::anyhow!(
                "Configuration error: source and destination chains have the same chain ID {}. Each chain must have a unique chain ID.",
                self.source_chain.chain_id
            ));
        }

        validate_contract_addr(&self.source_chain.bridge_contract_addr)
            .map_err(|e| anyhow::anyhow!("Invalid source bridge contract address: {}", e))?;
        validate_contract_addr(&self.destination_chain.bridge_contract_addr)
            .map_err(|e| anyhow::anyhow!("Invalid destination bridge contract address: {}", e))?;

        if self.relayer.scan_window == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: scan_window must be greater than zero"
            ));
        }
        if self.relayer.cycle_interval_ms == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: cycle_interval_ms must be greater than zero"
            ));
        }

        Ok(())
    }
}

/// Validates a `0x`-prefixed 20-byte hex contract address.
fn validate_contract_addr(addr: &str) -> anyhow::Result<()> {
    let stripped = addr
        .strip_prefix("0x")
        .ok_or_else(|| anyhow::anyhow!("address must be a 0x-prefixed hex string"))?;
    let bytes = hex::decode(stripped).map_err(|_| anyhow::anyhow!("invalid hex address"))?;
    if bytes.len() != 20 {
        anyhow::bail!("invalid address length: expected 20 bytes, got {}", bytes.len());
    }
    Ok(())
}
