//! EVM Client Module
//!
//! This module provides a client for communicating with EVM-compatible
//! blockchain nodes via their JSON-RPC API. The same client type serves
//! both roles of the relayer: reading lock events from the source chain
//! and submitting mint instructions to the destination chain.

use async_trait::async_trait;
use primitive_types::U256;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::time::Duration;
use tracing::warn;

use crate::ledger::LockEvent;
use crate::relayer::{ChainReadError, ChainReader, Submitter};

/// Solidity signature of the source-chain lock event.
const LOCK_EVENT_SIGNATURE: &str = "TokensLocked(address,address,uint256,uint256)";

/// Solidity signature of the destination-chain mint function.
const MINT_FUNCTION_SIGNATURE: &str = "mintBridgedTokens(address,uint256,bytes32)";

// ============================================================================
// API RESPONSE STRUCTURES
// ============================================================================

/// EVM JSON-RPC request wrapper
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<serde_json::Value>,
    id: u64,
}

/// EVM JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    result: Option<T>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// EVM event log entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvmLog {
    /// Address of the contract that emitted the event
    pub address: String,
    /// Array of topics (indexed event parameters)
    pub topics: Vec<String>,
    /// Event data (non-indexed parameters)
    pub data: String,
    /// Block number (JSON-RPC uses camelCase: blockNumber)
    #[serde(rename = "blockNumber")]
    pub block_number: String,
    /// Transaction hash (JSON-RPC uses camelCase: transactionHash)
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
}

// ============================================================================
// EVM CLIENT IMPLEMENTATION
// ============================================================================

/// Client for one EVM-compatible blockchain node.
pub struct EvmClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the EVM node (e.g., "http://127.0.0.1:8545")
    base_url: String,
    /// Bridge contract address on this chain
    bridge_contract_addr: String,
}

impl EvmClient {
    /// Creates a new EVM client for the given node URL.
    ///
    /// # Arguments
    ///
    /// * `node_url` - Base URL of the EVM node
    /// * `bridge_contract_addr` - Address of the bridge contract on this chain
    ///
    /// # Returns
    ///
    /// * `Ok(EvmClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create the HTTP client
    pub fn new(node_url: &str, bridge_contract_addr: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: node_url.to_string(),
            bridge_contract_addr: bridge_contract_addr.to_string(),
        })
    }

    /// Sends a JSON-RPC request and decodes the `result` field.
    async fn send_request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, ChainReadError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ChainReadError::Transport(format!(
                    "Failed to send {} request to {}: {}",
                    method, self.base_url, e
                ))
            })?
            .json()
            .await
            .map_err(|e| {
                ChainReadError::InvalidResponse(format!(
                    "Failed to parse {} response from {}: {}",
                    method, self.base_url, e
                ))
            })?;

        if let Some(error) = response.error {
            // Nodes that have not synced the requested range report it as a
            // missing block or unavailable state; map those onto the
            // transient variant so a scan failure does not fail the cycle.
            let lowered = error.message.to_lowercase();
            if lowered.contains("not found")
                || lowered.contains("unavailable")
                || lowered.contains("missing")
            {
                return Err(ChainReadError::RangeUnavailable(error.message));
            }
            return Err(ChainReadError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or_else(|| {
            ChainReadError::InvalidResponse(format!(
                "{} response from {} carried neither result nor error",
                method, self.base_url
            ))
        })
    }

    /// Decodes a raw EVM log into a lock event.
    ///
    /// Log layout for `TokensLocked(address indexed sender, address token,
    /// uint256 amount, uint256 destinationChainId)`:
    /// topics[0] = event signature, topics[1] = sender; data holds token,
    /// amount, and destinationChainId as three 32-byte words.
    fn decode_lock_event(&self, log: &EvmLog) -> Result<LockEvent, ChainReadError> {
        if log.topics.len() < 2 {
            return Err(ChainReadError::InvalidResponse(format!(
                "lock event log {} has {} topic(s), expected 2",
                log.transaction_hash,
                log.topics.len()
            )));
        }

        let sender_topic = log.topics[1].strip_prefix("0x").unwrap_or(&log.topics[1]);
        if sender_topic.len() != 64 {
            return Err(ChainReadError::InvalidResponse(format!(
                "malformed sender topic in log {}",
                log.transaction_hash
            )));
        }
        let sender = format!("0x{}", &sender_topic[24..]);

        let data = log.data.strip_prefix("0x").unwrap_or(&log.data);
        if data.len() < 192 {
            return Err(ChainReadError::InvalidResponse(format!(
                "lock event data too short in log {} ({} hex chars)",
                log.transaction_hash,
                data.len()
            )));
        }

        let token = format!("0x{}", &data[24..64]);
        let amount_bytes = hex::decode(&data[64..128]).map_err(|_| {
            ChainReadError::InvalidResponse(format!(
                "invalid amount encoding in log {}",
                log.transaction_hash
            ))
        })?;
        let amount = U256::from_big_endian(&amount_bytes);

        let chain_id_word = U256::from_big_endian(&hex::decode(&data[128..192]).map_err(
            |_| {
                ChainReadError::InvalidResponse(format!(
                    "invalid destination chain id encoding in log {}",
                    log.transaction_hash
                ))
            },
        )?);
        if chain_id_word > U256::from(u64::MAX) {
            return Err(ChainReadError::InvalidResponse(format!(
                "destination chain id out of range in log {}",
                log.transaction_hash
            )));
        }
        let destination_chain_id = chain_id_word.as_u64();

        let source_block_number = parse_hex_quantity(&log.block_number)?;

        Ok(LockEvent {
            sender,
            token,
            amount,
            destination_chain_id,
            source_tx_hash: log.transaction_hash.clone(),
            source_block_number,
        })
    }
}

#[async_trait]
impl ChainReader for EvmClient {
    async fn head_block(&self) -> Result<u64, ChainReadError> {
        let head: String = self.send_request("eth_blockNumber", Vec::new()).await?;
        parse_hex_quantity(&head)
    }

    async fn lock_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LockEvent>, ChainReadError> {
        let event_signature = format!("0x{}", hex::encode(keccak256(LOCK_EVENT_SIGNATURE)));

        let filter = serde_json::json!({
            "address": self.bridge_contract_addr,
            "topics": [event_signature],
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": format!("0x{:x}", to_block),
        });

        let logs: Vec<EvmLog> = self.send_request("eth_getLogs", vec![filter]).await?;

        let mut events = Vec::new();
        for log in &logs {
            match self.decode_lock_event(log) {
                Ok(event) => events.push(event),
                Err(e) => {
                    // A malformed log is skipped; the rest of the window is
                    // still ingested.
                    warn!("Skipping undecodable lock event log: {}", e);
                }
            }
        }
        events.sort_by_key(|event| event.source_block_number);

        Ok(events)
    }
}

#[async_trait]
impl Submitter for EvmClient {
    async fn submit_mint(
        &self,
        recipient: &str,
        amount: U256,
        source_tx_hash: &str,
    ) -> anyhow::Result<String> {
        let calldata = encode_mint_calldata(recipient, amount, source_tx_hash)?;

        // Submission goes through the node's managed account; key handling
        // is the node's responsibility, not the relayer's.
        let tx = serde_json::json!({
            "to": self.bridge_contract_addr,
            "data": calldata,
        });

        let destination_tx_hash: String =
            self.send_request("eth_sendTransaction", vec![tx]).await?;
        Ok(destination_tx_hash)
    }
}

// ============================================================================
// ENCODING HELPERS
// ============================================================================

/// Keccak256 digest of a string.
fn keccak256(input: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(input.as_bytes());
    hasher.finalize().into()
}

/// Parses a `0x`-prefixed hex quantity into a u64.
fn parse_hex_quantity(value: &str) -> Result<u64, ChainReadError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(stripped, 16).map_err(|_| {
        ChainReadError::InvalidResponse(format!("invalid hex quantity: {}", value))
    })
}

/// ABI-encodes the `mintBridgedTokens(address,uint256,bytes32)` call.
fn encode_mint_calldata(
    recipient: &str,
    amount: U256,
    source_tx_hash: &str,
) -> anyhow::Result<String> {
    let selector = &keccak256(MINT_FUNCTION_SIGNATURE)[..4];

    let recipient_hex = recipient.strip_prefix("0x").unwrap_or(recipient);
    let recipient_bytes = hex::decode(recipient_hex)
        .map_err(|_| anyhow::anyhow!("Invalid recipient address: {}", recipient))?;
    if recipient_bytes.len() != 20 {
        anyhow::bail!(
            "Invalid recipient address length: expected 20 bytes, got {}",
            recipient_bytes.len()
        );
    }

    let hash_hex = source_tx_hash.strip_prefix("0x").unwrap_or(source_tx_hash);
    let hash_bytes = hex::decode(hash_hex)
        .map_err(|_| anyhow::anyhow!("Invalid source tx hash: {}", source_tx_hash))?;
    if hash_bytes.len() != 32 {
        anyhow::bail!(
            "Invalid source tx hash length: expected 32 bytes, got {}",
            hash_bytes.len()
        );
    }

    let mut amount_word = [0u8; 32];
    amount.to_big_endian(&mut amount_word);

    let mut calldata = Vec::with_capacity(4 + 3 * 32);
    calldata.extend_from_slice(selector);
    calldata.extend_from_slice(&[0u8; 12]);
    calldata.extend_from_slice(&recipient_bytes);
    calldata.extend_from_slice(&amount_word);
    calldata.extend_from_slice(&hash_bytes);

    Ok(format!("0x{}", hex::encode(calldata)))
}
