//! End-to-end scenarios for the hedge coordinator state machine.
//!
//! These tests run under tokio's paused clock (`start_paused = true`) so
//! that the millisecond choreography is deterministic: sleeps and timeouts
//! advance virtual time instead of racing the wall clock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hedgeline_core::{
    coordinate, CompletionGate, HedgeConfig, HedgeCoordinator, HedgeError, HedgedOperation,
    ResponseSlot,
};

/// Scripted operation: waits `pause`, then delivers its id as the value or
/// records a scripted error. Counts `start`/`stop` invocations and records
/// the gate/slot pair each `start` received so tests can assert sharing.
struct TestOperation {
    id: u32,
    pause: Duration,
    error: Option<&'static str>,
    abortable: bool,
    started: AtomicUsize,
    stopped: AtomicUsize,
    cancelled: AtomicBool,
    handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
    seen: Mutex<Vec<(Arc<CompletionGate>, Arc<ResponseSlot<u32>>)>>,
}

impl TestOperation {
    fn new(id: u32, pause_ms: u64, error: Option<&'static str>, abortable: bool) -> Self {
        Self {
            id,
            pause: Duration::from_millis(pause_ms),
            error,
            abortable,
            started: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            handle: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn answering(id: u32, pause_ms: u64) -> Self {
        Self::new(id, pause_ms, None, true)
    }

    fn failing(pause_ms: u64, message: &'static str) -> Self {
        Self::new(0, pause_ms, Some(message), true)
    }

    fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn seen_pairs(&self) -> Vec<(Arc<CompletionGate>, Arc<ResponseSlot<u32>>)> {
        self.seen.lock().unwrap().clone()
    }
}

impl HedgedOperation<u32> for TestOperation {
    fn start(&self, gate: Arc<CompletionGate>, slot: Arc<ResponseSlot<u32>>) {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((Arc::clone(&gate), Arc::clone(&slot)));

        let pause = self.pause;
        let id = self.id;
        let error = self.error;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(pause).await;
            match error {
                Some(message) => slot.set_error(message),
                None => {
                    slot.try_set_value(id);
                }
            }
            gate.open();
        });
        *self.handle.lock().unwrap() = Some(handle);
    }

    fn stop(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
        if !self.abortable {
            return;
        }
        if let Some(handle) = self.handle.lock().unwrap().take() {
            if !handle.is_finished() {
                handle.abort();
                self.cancelled.store(true, Ordering::SeqCst);
            }
        }
    }
}

async fn run(
    primary: &TestOperation,
    fallback: &TestOperation,
    grace_ms: u64,
    deadline_ms: u64,
) -> Result<u32, HedgeError> {
    coordinate(
        primary,
        fallback,
        Duration::from_millis(grace_ms),
        Duration::from_millis(deadline_ms),
    )
    .await
}

/// The primary answers well within the grace period. The
/// fallback must never start, and nothing is stopped.
#[tokio::test(start_paused = true)]
async fn primary_wins_within_grace() {
    let primary = TestOperation::answering(1, 20);
    let fallback = TestOperation::answering(2, 20);

    let value = run(&primary, &fallback, 60, 300).await.unwrap();

    // Give a would-be fallback time to show up before asserting.
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(value, 1);
    assert_eq!(primary.started(), 1);
    assert_eq!(fallback.started(), 0);
    assert_eq!(primary.stopped(), 0);
    assert_eq!(fallback.stopped(), 0);
}

/// The primary is slow, the hedge fires at the grace boundary
/// and the fallback's answer wins. Both operations are stopped afterwards.
#[tokio::test(start_paused = true)]
async fn fallback_wins_after_hedge() {
    let primary = TestOperation::answering(1, 60);
    let fallback = TestOperation::answering(2, 20);

    let value = run(&primary, &fallback, 20, 300).await.unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(value, 2);
    assert_eq!(primary.started(), 1);
    assert_eq!(fallback.started(), 1);
    assert_eq!(primary.stopped(), 1);
    assert_eq!(fallback.stopped(), 1);
    // The slow primary was still in flight when stop() arrived.
    assert!(primary.was_cancelled());
}

/// In the hedged phase the fallback must join the primary's gate and slot,
/// so that the first terminal write from either operation settles the call.
#[tokio::test(start_paused = true)]
async fn hedged_fallback_shares_gate_and_slot() {
    let primary = TestOperation::answering(1, 60);
    let fallback = TestOperation::answering(2, 20);

    run(&primary, &fallback, 20, 300).await.unwrap();

    let primary_seen = primary.seen_pairs();
    let fallback_seen = fallback.seen_pairs();
    assert_eq!(primary_seen.len(), 1);
    assert_eq!(fallback_seen.len(), 1);
    assert!(Arc::ptr_eq(&primary_seen[0].0, &fallback_seen[0].0));
    assert!(Arc::ptr_eq(&primary_seen[0].1, &fallback_seen[0].1));
}

/// The primary can still win after the hedge fired, if it beats the
/// fallback to the shared slot.
#[tokio::test(start_paused = true)]
async fn primary_wins_after_hedge() {
    let primary = TestOperation::answering(1, 30);
    let fallback = TestOperation::answering(2, 60);

    let value = run(&primary, &fallback, 10, 300).await.unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(value, 1);
    assert_eq!(primary.stopped(), 1);
    assert_eq!(fallback.stopped(), 1);
    assert!(fallback.was_cancelled());
}

/// Operations that cannot be cancelled. stop() is still
/// invoked and must be a harmless no-op.
#[tokio::test(start_paused = true)]
async fn stop_is_a_noop_on_uncancellable_operations() {
    let primary = TestOperation::new(1, 60, None, false);
    let fallback = TestOperation::answering(2, 20);

    let value = run(&primary, &fallback, 20, 300).await.unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(value, 2);
    assert_eq!(primary.stopped(), 1);
    assert!(!primary.was_cancelled());
}

/// The primary fails immediately, so the fallback starts right
/// away - at the failure instant, not at grace expiry - solo, with a fresh
/// gate and slot, and nothing is ever stopped.
#[tokio::test(start_paused = true)]
async fn fallback_runs_solo_after_primary_failure() {
    let primary = TestOperation::failing(0, "shard unreachable");
    let fallback = TestOperation::answering(2, 20);

    let started_at = tokio::time::Instant::now();
    let value = run(&primary, &fallback, 40, 300).await.unwrap();
    let elapsed = started_at.elapsed();

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(value, 2);
    // Finished before the grace period would even have expired.
    assert!(elapsed < Duration::from_millis(40), "elapsed {elapsed:?}");
    assert_eq!(fallback.started(), 1);
    assert_eq!(primary.stopped(), 0);
    assert_eq!(fallback.stopped(), 0);

    // Fresh gate and slot for the solo attempt.
    let primary_seen = primary.seen_pairs();
    let fallback_seen = fallback.seen_pairs();
    assert!(!Arc::ptr_eq(&primary_seen[0].0, &fallback_seen[0].0));
    assert!(!Arc::ptr_eq(&primary_seen[0].1, &fallback_seen[0].1));
}

/// Both operations fail. The coordinator surfaces an operation
/// failure wrapping the fallback's error, and stop() is never invoked.
#[tokio::test(start_paused = true)]
async fn both_failing_surfaces_operation_error() {
    let primary = TestOperation::failing(20, "primary exploded");
    let fallback = TestOperation::failing(20, "fallback exploded");

    let err = run(&primary, &fallback, 40, 300).await.unwrap_err();

    tokio::time::sleep(Duration::from_millis(60)).await;

    match &err {
        HedgeError::Operation(cause) => {
            assert_eq!(cause.to_string(), "fallback exploded");
        }
        other => panic!("expected Operation error, got {other:?}"),
    }
    assert_eq!(primary.stopped(), 0);
    assert_eq!(fallback.stopped(), 0);
}

/// Primary fails fast and the solo fallback then misses the remaining
/// budget entirely: a fallback timeout, with no cancellation on this path.
#[tokio::test(start_paused = true)]
async fn solo_fallback_timeout() {
    let primary = TestOperation::failing(0, "primary exploded");
    let fallback = TestOperation::answering(2, 200);

    let err = run(&primary, &fallback, 40, 100).await.unwrap_err();

    assert!(matches!(err, HedgeError::FallbackTimeout { budget_ms: 60 }));
    assert_eq!(fallback.started(), 1);
    assert_eq!(primary.stopped(), 0);
    assert_eq!(fallback.stopped(), 0);
}

/// Neither operation answers within the deadline. Both are
/// stopped after the budget elapses.
#[tokio::test(start_paused = true)]
async fn both_timing_out_fails_the_call() {
    let primary = TestOperation::answering(1, 60);
    let fallback = TestOperation::answering(2, 60);

    let err = run(&primary, &fallback, 20, 40).await.unwrap_err();

    assert!(matches!(err, HedgeError::BothTimedOut { budget_ms: 20 }));
    assert_eq!(primary.started(), 1);
    assert_eq!(fallback.started(), 1);
    assert_eq!(primary.stopped(), 1);
    assert_eq!(fallback.stopped(), 1);
}

/// The documented race: the hedge fires, the fallback fails
/// fast and opens the shared gate, and the call fails with the fallback's
/// error even though the primary would have delivered a value later. The
/// primary's eventual value is accepted into the slot but never observed.
#[tokio::test(start_paused = true)]
async fn fallback_error_preempts_slower_primary_value() {
    let primary = TestOperation::answering(1, 40);
    let fallback = TestOperation::failing(10, "fallback exploded");

    let err = run(&primary, &fallback, 10, 300).await.unwrap_err();

    match &err {
        HedgeError::Operation(cause) => {
            assert_eq!(cause.to_string(), "fallback exploded");
        }
        other => panic!("expected Operation error, got {other:?}"),
    }
    assert_eq!(primary.stopped(), 1);
    assert_eq!(fallback.stopped(), 1);
}

/// The coordinator is reusable: each run is independent, with fresh gates
/// and slots.
#[tokio::test(start_paused = true)]
async fn coordinator_is_reusable_across_calls() {
    let coordinator = HedgeCoordinator::new(HedgeConfig {
        grace_period: Duration::from_millis(20),
        deadline: Duration::from_millis(300),
    })
    .unwrap();

    let first_primary = TestOperation::answering(1, 5);
    let first_fallback = TestOperation::answering(2, 5);
    assert_eq!(
        coordinator
            .run(&first_primary, &first_fallback)
            .await
            .unwrap(),
        1
    );

    let second_primary = TestOperation::answering(3, 60);
    let second_fallback = TestOperation::answering(4, 5);
    assert_eq!(
        coordinator
            .run(&second_primary, &second_fallback)
            .await
            .unwrap(),
        4
    );
}
