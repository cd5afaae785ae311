//! Search wire types.
//!
//! The shard endpoints speak a small JSON protocol: a query document is
//! POSTed to `/search` and the shard answers with a hit list. Both shards
//! are replicas of the same index, so either answer is acceptable.

use serde::{Deserialize, Serialize};

/// Default number of hits requested per query.
pub const DEFAULT_MAX_HITS: usize = 10;

/// A search query sent to a shard endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    /// Query string in the shard's query syntax
    pub query: String,
    /// Maximum number of hits to return
    pub max_hits: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_hits: DEFAULT_MAX_HITS,
        }
    }

    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }
}

/// A single matching document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Document identifier
    pub id: String,
    /// Relevance score assigned by the shard
    pub score: f32,
    /// The stored document body, if the shard returns one
    #[serde(default)]
    pub source: serde_json::Value,
}

/// A shard's answer to a [`SearchRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// Shard-side query time in milliseconds
    pub took_ms: u64,
    /// Total number of matching documents (may exceed `hits.len()`)
    pub total_hits: u64,
    /// The returned hits, best first
    pub hits: Vec<SearchHit>,
}
