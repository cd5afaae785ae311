use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Building or sending the HTTP request failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The shard answered with a non-success HTTP status.
    #[error("Search endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// Serializing the query or parsing the response body failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
