//! Bridge Relayer Service
//!
//! A relayer service that watches a source chain for token-lock events,
//! obtains an external attestation authorizing a mint on the destination
//! chain, and submits the mint instruction. Transfers are tracked through a
//! bounded lifecycle in an in-memory ledger; state is lost on restart.
//!
//! ## Overview
//!
//! Each polling cycle the relayer:
//! 1. Scans a bounded window of source blocks for new lock events
//! 2. Advances every tracked transaction by at most one lifecycle step
//! 3. Evicts terminal transactions older than the retention window

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

mod api;
mod attestation;
mod config;
mod evm_client;
mod ledger;
mod relayer;
mod scanner;

use attestation::AttestationClient;
use config::Config;
use evm_client::EvmClient;
use ledger::TransactionLedger;
use relayer::{ChainReader, RelayOrchestrator};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point that initializes and runs the relayer.
///
/// This function:
/// 1. Initializes logging and tracing
/// 2. Loads configuration from TOML file
/// 3. Probes both chain endpoints (failure here is fatal)
/// 4. Starts the background relay loop
/// 5. Serves the status API until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting Bridge Relayer Service");

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("Bridge Relayer Service");
        println!();
        println!("Usage: bridge-relayer [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Use custom config file path");
        println!("  --help, -h        Show this help message");
        println!();
        println!("Environment variables:");
        println!("  RELAYER_CONFIG_PATH    Path to config file (overrides --config)");
        return Ok(());
    }

    let mut config_path = None;
    for (i, arg) in args.iter().enumerate() {
        if arg == "--config" && i + 1 < args.len() {
            config_path = Some(args[i + 1].clone());
            break;
        }
    }
    if let Some(path) = config_path {
        std::env::set_var("RELAYER_CONFIG_PATH", &path);
        info!("Using custom config: {}", path);
    }

    let config = Arc::new(Config::load()?);
    info!("Configuration loaded successfully");

    // Chain clients. Failing to reach either endpoint at startup is fatal.
    let source_client = EvmClient::new(
        &config.source_chain.rpc_url,
        &config.source_chain.bridge_contract_addr,
    )
    .context("Failed to create source chain client")?;
    let destination_client = EvmClient::new(
        &config.destination_chain.rpc_url,
        &config.destination_chain.bridge_contract_addr,
    )
    .context("Failed to create destination chain client")?;

    let source_head = source_client.head_block().await.with_context(|| {
        format!(
            "Failed to connect to {} at {}",
            config.source_chain.name, config.source_chain.rpc_url
        )
    })?;
    info!(
        "Connected to {} (chain id {}), head block {}",
        config.source_chain.name, config.source_chain.chain_id, source_head
    );

    let destination_head = destination_client.head_block().await.with_context(|| {
        format!(
            "Failed to connect to {} at {}",
            config.destination_chain.name, config.destination_chain.rpc_url
        )
    })?;
    info!(
        "Connected to {} (chain id {}), head block {}",
        config.destination_chain.name, config.destination_chain.chain_id, destination_head
    );

    let validator = AttestationClient::new(
        &config.relayer.attestation_url,
        config.relayer.attestation_timeout_ms,
    )?;

    let ledger = Arc::new(RwLock::new(TransactionLedger::new()));

    // Scanning starts from the block before the current head.
    let start_block = source_head.saturating_sub(1);
    let mut orchestrator = RelayOrchestrator::new(
        config.clone(),
        source_client,
        validator,
        destination_client,
        ledger.clone(),
        start_block,
    );

    info!("Starting background relay loop");
    tokio::spawn(async move {
        orchestrator.run().await;
    });

    // Run the status API (this blocks until shutdown)
    let api_server = api::ApiServer::new(config, ledger);
    api_server.run().await?;

    Ok(())
}
