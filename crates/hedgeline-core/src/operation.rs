//! The capability contract a hedged operation must satisfy.

use std::sync::Arc;

use crate::gate::CompletionGate;
use crate::slot::ResponseSlot;

/// An asynchronous operation that can be raced against a redundant twin by
/// the [`HedgeCoordinator`](crate::coordinator::HedgeCoordinator).
///
/// # Contract
///
/// `start` must return immediately: the work runs on a task the
/// implementation spawns itself, never on the caller. Each `start`
/// invocation performs exactly one terminal write into its assigned slot -
/// either `slot.try_set_value(result)` on success or `slot.set_error(err)`
/// on failure - and then opens the gate. The gate is opened only after the
/// write, so any task observing the gate open can safely read the slot.
///
/// `stop` is a best-effort cancellation hint. It may be called zero or more
/// times, including after the operation already finished and including when
/// it was never started, and must never panic. If this operation instance
/// cannot be cancelled, `stop` is a no-op. Implementations are encouraged
/// to track internally whether cancellation actually took effect (useful in
/// tests), but that is not part of this contract.
pub trait HedgedOperation<T>: Send + Sync {
    /// Begins the work asynchronously. The terminal result goes into `slot`,
    /// followed by `gate.open()`.
    fn start(&self, gate: Arc<CompletionGate>, slot: Arc<ResponseSlot<T>>);

    /// Requests best-effort cancellation of in-flight work.
    fn stop(&self);
}
