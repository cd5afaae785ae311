//! Single-assignment response slot.
//!
//! A [`ResponseSlot`] carries a result from one or two racing writers back to
//! the coordinator. The value field is write-once: the first writer to call
//! [`ResponseSlot::try_set_value`] wins, every later attempt is a silent
//! no-op. The error field is deliberately weaker - last write wins - because
//! a stale error must never shadow a successful value, and a later failure
//! message is at least as informative as an earlier one.

use std::sync::{Mutex, PoisonError};

use crate::error::{BoxError, HedgeError, Result};

struct SlotState<T> {
    value: Option<T>,
    /// True once a value has ever been stored. Kept separate from `value`
    /// so that resolving (which moves the value out) does not reopen the
    /// slot for a late writer.
    stored: bool,
    error: Option<BoxError>,
}

/// Race-free container storing at most one successful value, settable
/// concurrently from multiple tasks or threads.
///
/// One slot is created per logical attempt and discarded when the
/// coordinator call returns. In the hedged phase a single slot is shared by
/// both writers; in the solo-fallback phase the fallback gets a fresh one.
///
/// # Invariants
///
/// - Once a value has been stored, no later write replaces it.
/// - Success, if present, always wins over any recorded error on
///   [`resolve`](ResponseSlot::resolve); the two fields are independent.
pub struct ResponseSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> ResponseSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                value: None,
                stored: false,
                error: None,
            }),
        }
    }

    /// Stores `value` if no value has been stored yet.
    ///
    /// The check-and-set is atomic across all concurrent callers: exactly
    /// one of them observes an empty slot and wins.
    ///
    /// # Returns
    ///
    /// `true` if this call stored the value, `false` if a value was already
    /// present (the losing write is discarded without error).
    pub fn try_set_value(&self, value: T) -> bool {
        let mut state = self.lock();
        if state.stored {
            return false;
        }
        state.value = Some(value);
        state.stored = true;
        true
    }

    /// Records an error, unconditionally overwriting any previous one.
    ///
    /// No ordering is guaranteed with respect to concurrent
    /// [`try_set_value`](ResponseSlot::try_set_value) calls beyond per-field
    /// atomicity.
    pub fn set_error(&self, error: impl Into<BoxError>) {
        self.lock().error = Some(error.into());
    }

    /// True iff a value has ever been stored. Ignores the error state, and
    /// stays true after the value has been consumed by
    /// [`resolve`](ResponseSlot::resolve).
    pub fn has_value(&self) -> bool {
        self.lock().stored
    }

    /// Produces the slot's terminal result.
    ///
    /// A stored value always wins, even if `set_error` was called before or
    /// after it. With no value and a recorded error, fails with
    /// [`HedgeError::Operation`] carrying the original error as the cause.
    ///
    /// Callers must only resolve after a completion gate confirmed that a
    /// writer performed its terminal write; resolving an untouched slot is
    /// reported as an internal error.
    pub fn resolve(&self) -> Result<T> {
        let mut state = self.lock();
        if !state.stored {
            if let Some(error) = state.error.take() {
                return Err(HedgeError::Operation(error));
            }
            return Err(HedgeError::Internal(
                "slot resolved before any terminal write",
            ));
        }
        state
            .value
            .take()
            .ok_or(HedgeError::Internal("slot value already consumed"))
    }

    /// Locks the slot state, tolerating poison: a writer that panicked can
    /// only have left a fully written or fully unwritten field behind, and
    /// the coordinator must still be able to read the slot.
    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ResponseSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
