//! Hedging search client.

use tracing::info;

use hedgeline_core::{HedgeConfig, HedgeCoordinator, Result};

use crate::operation::SearchOperation;
use crate::protocol::{SearchRequest, SearchResponse};

/// Search client that hedges each query across two equivalent shard
/// endpoints.
///
/// Every [`search`](SearchClient::search) call issues the query to the
/// primary shard, gives it the configured grace period, and only queries
/// the secondary shard if the primary has not answered by then. The call
/// resolves to whichever shard answers first, bounded by the overall
/// deadline.
pub struct SearchClient {
    primary_endpoint: String,
    secondary_endpoint: String,
    config: HedgeConfig,
}

impl SearchClient {
    /// Creates a client over two shard endpoints (`host:port`) with the
    /// default hedge timing (800ms grace, 5s deadline).
    pub fn new(primary_endpoint: impl Into<String>, secondary_endpoint: impl Into<String>) -> Self {
        Self::with_config(primary_endpoint, secondary_endpoint, HedgeConfig::default())
    }

    /// Creates a client with custom hedge timing.
    pub fn with_config(
        primary_endpoint: impl Into<String>,
        secondary_endpoint: impl Into<String>,
        config: HedgeConfig,
    ) -> Self {
        Self {
            primary_endpoint: primary_endpoint.into(),
            secondary_endpoint: secondary_endpoint.into(),
            config,
        }
    }

    /// Runs one hedged search.
    ///
    /// # Errors
    ///
    /// Surfaces the coordinator's failure taxonomy unchanged: an operation
    /// failure wrapping the shard's error, a fallback timeout, a
    /// both-timed-out failure, or an invalid-budget configuration error.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let coordinator = HedgeCoordinator::new(self.config.clone())?;
        let primary = SearchOperation::new(self.primary_endpoint.clone(), request.clone());
        let fallback = SearchOperation::new(self.secondary_endpoint.clone(), request);

        let response = coordinator.run(&primary, &fallback).await?;
        info!(
            total_hits = response.total_hits,
            took_ms = response.took_ms,
            "hedged search resolved"
        );
        Ok(response)
    }
}
