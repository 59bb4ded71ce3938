//! Attestation Client Module
//!
//! This module performs the attestation round-trip against the external
//! validator service that authorizes mints on the destination chain. The
//! call is bounded by a fixed timeout; failure is never fatal to the
//! orchestrator, which simply retries on the next cycle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::relayer::ValidationClient;

/// HTTP client for the external attestation service.
pub struct AttestationClient {
    /// HTTP client with the attestation timeout applied
    client: Client,
    /// Attestation service endpoint
    url: String,
}

impl AttestationClient {
    /// Creates a new attestation client.
    ///
    /// # Arguments
    ///
    /// * `url` - Attestation service endpoint
    /// * `timeout_ms` - Round-trip timeout in milliseconds
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .context("Failed to create attestation HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ValidationClient for AttestationClient {
    async fn attest(&self, source_tx_hash: &str) -> Result<()> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("source_tx_hash", source_tx_hash)])
            .send()
            .await
            .with_context(|| format!("Failed to contact attestation service at {}", self.url))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Attestation service returned status {}",
                response.status()
            ))
        }
    }
}
