//! Two-phase hedge coordinator.
//!
//! The coordinator drives one logical call across two redundant operations.
//! It starts the primary, waits up to the grace period, and then branches:
//!
//! - **Primary finished in time**: return its value, or - if it only
//!   reported an error - run the fallback solo with a fresh gate and slot
//!   for the remaining budget.
//! - **Primary still pending**: start the fallback against the *same* gate
//!   and slot and take whichever terminal write opens the gate first, then
//!   ask both operations to stop.
//!
//! The calling task suspends at exactly two points - the grace-period wait
//! and the remaining-budget wait - and both are bounded. The coordinator
//! holds no mutable state across calls; each call is independent.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{HedgeError, Result};
use crate::gate::CompletionGate;
use crate::operation::HedgedOperation;
use crate::slot::ResponseSlot;

/// Timing parameters for one hedged call.
///
/// `grace_period` is how long the primary runs alone before the fallback is
/// considered; `deadline` is the total wall-clock budget for the call. The
/// defaults match a search-backend deployment profile: 800ms grace within a
/// 5s deadline.
#[derive(Debug, Clone)]
pub struct HedgeConfig {
    /// Time the primary runs alone before hedging begins.
    pub grace_period: Duration,
    /// Total time budget from call start. Must exceed `grace_period`.
    pub deadline: Duration,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_millis(800),
            deadline: Duration::from_secs(5),
        }
    }
}

/// Orchestrates a primary and a fallback [`HedgedOperation`] into a single
/// result, bounded by [`HedgeConfig`]'s grace period and deadline.
///
/// # Latency over correctness-of-choice
///
/// In the hedged phase both operations share one slot and one gate, and the
/// slot is resolved the instant the gate opens. If the first writer to open
/// the gate wrote only an error while the other writer was still racing to
/// deliver a value, that value is lost and the call fails with the error.
/// Waiting for the second writer would fix this corner case at the cost of
/// unbounded extra latency, so the race is kept as-is.
#[derive(Debug)]
pub struct HedgeCoordinator {
    grace_period: Duration,
    /// Budget consumed after the grace period elapses, regardless of which
    /// branch executes. Computed once at construction.
    remaining_budget: Duration,
}

impl HedgeCoordinator {
    /// Creates a coordinator from the given timing parameters.
    ///
    /// # Errors
    ///
    /// [`HedgeError::InvalidBudget`] if `deadline <= grace_period`, which
    /// would leave no budget for the post-grace wait. Invalid budgets are
    /// rejected rather than clamped so that misconfiguration surfaces at
    /// construction instead of as spurious timeouts.
    pub fn new(config: HedgeConfig) -> Result<Self> {
        if config.deadline <= config.grace_period {
            return Err(HedgeError::InvalidBudget {
                grace_ms: config.grace_period.as_millis() as u64,
                deadline_ms: config.deadline.as_millis() as u64,
            });
        }
        Ok(Self {
            grace_period: config.grace_period,
            remaining_budget: config.deadline - config.grace_period,
        })
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Budget available after the grace period: `deadline - grace_period`.
    pub fn remaining_budget(&self) -> Duration {
        self.remaining_budget
    }

    /// Runs one hedged call and resolves to a single value or one typed
    /// failure.
    ///
    /// # Errors
    ///
    /// - [`HedgeError::Operation`] - the resolved slot held only an error
    /// - [`HedgeError::FallbackTimeout`] - primary failed, solo fallback
    ///   missed the remaining budget
    /// - [`HedgeError::BothTimedOut`] - hedged phase produced no terminal
    ///   write within the remaining budget
    pub async fn run<T>(
        &self,
        primary: &dyn HedgedOperation<T>,
        fallback: &dyn HedgedOperation<T>,
    ) -> Result<T> {
        let gate = Arc::new(CompletionGate::new());
        let slot = Arc::new(ResponseSlot::new());
        primary.start(Arc::clone(&gate), Arc::clone(&slot));

        if gate.wait(self.grace_period).await {
            return self.primary_finished(fallback, &slot).await;
        }

        debug!(
            grace_ms = self.grace_period.as_millis() as u64,
            "primary still pending past the grace period, starting fallback"
        );
        // Same gate and slot as the primary: first terminal write wins.
        fallback.start(Arc::clone(&gate), Arc::clone(&slot));
        let finished = gate.wait(self.remaining_budget).await;

        // Unconditional best-effort cleanup of whichever operation is still
        // in flight. Safe on already-finished operations per the contract.
        primary.stop();
        fallback.stop();

        if finished {
            return slot.resolve();
        }
        warn!(
            budget_ms = self.remaining_budget.as_millis() as u64,
            "neither primary nor fallback answered within the budget"
        );
        Err(HedgeError::BothTimedOut {
            budget_ms: self.remaining_budget.as_millis() as u64,
        })
    }

    /// Handles the branch where the primary produced a terminal write within
    /// the grace period.
    ///
    /// Note there are no `stop` calls on this path: a successful primary
    /// finished on its own and the fallback was never started, and a solo
    /// fallback that times out is likewise left to run out. The latter means
    /// a timed-out solo fallback is not actively cancelled; changing that
    /// would change observable cancellation counts, so the behavior is kept.
    async fn primary_finished<T>(
        &self,
        fallback: &dyn HedgedOperation<T>,
        primary_slot: &ResponseSlot<T>,
    ) -> Result<T> {
        if primary_slot.has_value() {
            debug!("primary answered within the grace period");
            return primary_slot.resolve();
        }

        // Primary failed fast. The fallback gets the whole remaining budget
        // to itself, with a fresh gate and slot so the primary's error
        // cannot leak into its attempt.
        debug!("primary failed within the grace period, running fallback solo");
        let gate = Arc::new(CompletionGate::new());
        let slot = Arc::new(ResponseSlot::new());
        fallback.start(Arc::clone(&gate), Arc::clone(&slot));

        if gate.wait(self.remaining_budget).await {
            return slot.resolve();
        }
        Err(HedgeError::FallbackTimeout {
            budget_ms: self.remaining_budget.as_millis() as u64,
        })
    }
}

/// One-shot convenience wrapper: builds a [`HedgeCoordinator`] for the given
/// timing parameters and runs a single hedged call.
pub async fn coordinate<T>(
    primary: &dyn HedgedOperation<T>,
    fallback: &dyn HedgedOperation<T>,
    grace_period: Duration,
    deadline: Duration,
) -> Result<T> {
    HedgeCoordinator::new(HedgeConfig {
        grace_period,
        deadline,
    })?
    .run(primary, fallback)
    .await
}
