use thiserror::Error;

/// Boxed error type operations use to report failures across the
/// [`HedgedOperation`](crate::operation::HedgedOperation) boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum HedgeError {
    /// An operation reported a failure through the slot. The original error
    /// is preserved as the cause.
    #[error("Operation failed: {0}")]
    Operation(#[source] BoxError),

    /// The primary failed within the grace period and the solo fallback did
    /// not complete within the remaining budget.
    #[error("Fallback timed out {budget_ms}ms after the primary failed")]
    FallbackTimeout { budget_ms: u64 },

    /// Neither primary nor fallback produced a terminal write within the
    /// remaining budget after the grace period elapsed.
    #[error("Both primary and fallback timed out ({budget_ms}ms past the grace period)")]
    BothTimedOut { budget_ms: u64 },

    /// The configured deadline does not leave any budget past the grace
    /// period.
    #[error("Invalid hedge budget: deadline {deadline_ms}ms must be greater than grace period {grace_ms}ms")]
    InvalidBudget { grace_ms: u64, deadline_ms: u64 },

    /// Unexpected coordinator state, e.g. a slot resolved before any writer
    /// performed a terminal write.
    #[error("Hedge coordinator internal error: {0}")]
    Internal(&'static str),
}

pub type Result<T> = std::result::Result<T, HedgeError>;
