//! REST API Server Module
//!
//! This module provides the read-only status API of the relayer service.
//! The API exposes the health of the process and a snapshot of the
//! transaction ledger; it never mutates relay state. Status values are
//! serialized as stable SCREAMING_SNAKE_CASE strings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use warp::Filter;

use crate::config::Config;
use crate::ledger::{CrossChainTransaction, TransactionLedger};

// ============================================================================
// SHARED RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
}

// ============================================================================
// API SERVER
// ============================================================================

/// Read-only HTTP server over the transaction ledger.
pub struct ApiServer {
    /// Service configuration
    config: Arc<Config>,
    /// Shared transaction ledger
    ledger: Arc<RwLock<TransactionLedger>>,
}

impl ApiServer {
    /// Creates a new API server sharing the given ledger.
    pub fn new(config: Arc<Config>, ledger: Arc<RwLock<TransactionLedger>>) -> Self {
        Self { config, ledger }
    }

    /// Starts the API server and begins handling HTTP requests.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server ran to completion
    /// * `Err(anyhow::Error)` - Failed to bind the configured address
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting API server on {}:{}",
            self.config.api.host, self.config.api.port
        );

        let routes = self.create_routes();

        let addr: std::net::SocketAddr =
            format!("{}:{}", self.config.api.host, self.config.api.port)
                .parse()
                .context("Failed to parse API server address")?;

        warp::serve(routes).run(addr).await;

        Ok(())
    }

    /// Builds the route tree served by `run`.
    ///
    /// # Returns
    ///
    /// A warp filter containing all API routes
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let ledger = self.ledger.clone();

        let health = warp::path("health").and(warp::get()).map(|| {
            warp::reply::json(&ApiResponse {
                success: true,
                data: Some("ok"),
                error: None,
            })
        });

        let transactions = warp::path("transactions")
            .and(warp::get())
            .and(warp::any().map(move || ledger.clone()))
            .and_then(get_transactions_handler);

        health.or(transactions)
    }

    /// Public method for testing - exposes routes for integration tests
    #[allow(dead_code)] // Used by tests
    pub fn test_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        self.create_routes()
    }
}

/// Handler for the transactions endpoint.
///
/// Returns a snapshot of every ledger entry, newest first.
async fn get_transactions_handler(
    ledger: Arc<RwLock<TransactionLedger>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mut transactions: Vec<CrossChainTransaction> = ledger.read().await.transactions();
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(warp::reply::json(&ApiResponse {
        success: true,
        data: Some(transactions),
        error: None,
    }))
}
