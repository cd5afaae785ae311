//! Hedgeline Search - Hedged Document Search Client
//!
//! A search client that hedges one query across two equivalent shard
//! endpoints using [`hedgeline-core`](hedgeline_core). The primary shard is
//! queried first; if it does not answer within the grace period, the same
//! query is issued to the secondary shard and the first answer wins.
//!
//! # Components
//!
//! - [`protocol`] - the search request/response wire types (JSON)
//! - [`SearchOperation`] - one HTTP search call implementing the
//!   [`HedgedOperation`](hedgeline_core::HedgedOperation) contract
//! - [`SearchClient`] - the hedging entry point
//!
//! # Example
//!
//! ```no_run
//! use hedgeline_search::{SearchClient, SearchRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::new("10.0.0.1:9200", "10.0.0.2:9200");
//! let response = client.search(SearchRequest::new("rust hedging")).await?;
//! println!("{} hits in {}ms", response.total_hits, response.took_ms);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod protocol;

pub use client::SearchClient;
pub use error::{Result, SearchError};
pub use operation::SearchOperation;
pub use protocol::{SearchHit, SearchRequest, SearchResponse};
