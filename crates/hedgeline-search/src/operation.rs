//! One HTTP search call as a hedged operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Request;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use hedgeline_core::{CompletionGate, HedgedOperation, ResponseSlot};

use crate::error::SearchError;
use crate::protocol::{SearchRequest, SearchResponse};

/// A search call against one shard endpoint, conforming to the
/// [`HedgedOperation`] contract.
///
/// `start` spawns a task that POSTs the query to
/// `http://{endpoint}/search`, parses the JSON answer, performs the
/// terminal slot write, and opens the gate. Each request uses a fresh HTTP
/// connection so that hedged calls to the two shards proceed in parallel
/// without sharing connection state.
///
/// `stop` aborts the in-flight task if it has not finished. The operation
/// records whether an abort actually landed; [`was_cancelled`] exposes that
/// for tests.
///
/// [`was_cancelled`]: SearchOperation::was_cancelled
pub struct SearchOperation {
    endpoint: String,
    request: SearchRequest,
    handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
    cancelled: Arc<AtomicBool>,
}

impl SearchOperation {
    /// Creates an operation for one shard. `endpoint` is `host:port`.
    pub fn new(endpoint: impl Into<String>, request: SearchRequest) -> Self {
        Self {
            endpoint: endpoint.into(),
            request,
            handle: Mutex::new(None),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True if a `stop` call aborted the request while it was in flight.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Issues the search request and parses the response.
    async fn execute(
        endpoint: String,
        request: SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        let url = format!("http://{}/search", endpoint);
        let body = serde_json::to_vec(&request)?;

        let http_request = Request::builder()
            .method("POST")
            .uri(&url)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| SearchError::Transport(format!("Failed to build request: {}", e)))?;

        let client = Client::builder(TokioExecutor::new()).build_http();
        let response = client
            .request(http_request)
            .await
            .map_err(|e| SearchError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to read response: {}", e)))?
            .to_bytes();

        Ok(serde_json::from_slice(&body)?)
    }
}

impl HedgedOperation<SearchResponse> for SearchOperation {
    fn start(&self, gate: Arc<CompletionGate>, slot: Arc<ResponseSlot<SearchResponse>>) {
        let endpoint = self.endpoint.clone();
        let request = self.request.clone();

        let handle = tokio::spawn(async move {
            match Self::execute(endpoint.clone(), request).await {
                Ok(response) => {
                    if slot.try_set_value(response) {
                        debug!(endpoint = %endpoint, "search response accepted");
                    }
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "search request failed");
                    slot.set_error(e);
                }
            }
            gate.open();
        });

        *self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn stop(&self) {
        // Must never panic, even when called before start or after the
        // request already finished.
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if !handle.is_finished() {
                handle.abort();
                // The task may still win the race and complete before the
                // abort lands, so record the flag from the join outcome
                // rather than from having requested the abort.
                let cancelled = Arc::clone(&self.cancelled);
                tokio::spawn(async move {
                    if let Err(e) = handle.await {
                        if e.is_cancelled() {
                            cancelled.store(true, Ordering::Release);
                        }
                    }
                });
            }
        }
    }
}
