//! Single-shot completion gate.
//!
//! A [`CompletionGate`] signals that a response slot is ready to read. It
//! starts closed and opens exactly once; redundant opens from concurrent
//! writers are harmless. Unlike a oneshot channel it supports any number of
//! writers, which is exactly what the hedged phase needs: both the primary
//! and the fallback open the same gate, whoever finishes first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Single-shot, multi-writer completion signal with bounded waits.
///
/// A writer's terminal slot write is sequenced before its [`open`] call
/// (release ordering on the open flag), so a waiter that observes the gate
/// open is guaranteed to see that write in the slot.
///
/// [`open`]: CompletionGate::open
pub struct CompletionGate {
    opened: AtomicBool,
    notify: Notify,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self {
            opened: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Opens the gate. Idempotent: any number of writers may call this
    /// concurrently, and opens after the first have no further effect.
    pub fn open(&self) {
        self.opened.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_open(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }

    /// Waits until the gate opens or `timeout` elapses, whichever first.
    ///
    /// # Returns
    ///
    /// `true` if the gate opened within the timeout, `false` on elapse.
    pub async fn wait(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.opened()).await.is_ok()
    }

    /// Resolves once the gate is open.
    ///
    /// Uses the enable-then-recheck pattern: the waiter registers with the
    /// `Notify` before re-checking the flag, so an `open()` that lands
    /// between the check and the await cannot be missed.
    pub async fn opened(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        loop {
            if self.is_open() {
                return;
            }
            notified.as_mut().enable();
            if self.is_open() {
                return;
            }
            notified.as_mut().await;
            notified.set(self.notify.notified());
        }
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}
