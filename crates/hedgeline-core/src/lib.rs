//! Hedgeline Core - Hedged Request Coordination
//!
//! This crate implements the hedged-request pattern: given two redundant ways
//! of obtaining the same logical result (e.g., two equivalent backend shards),
//! issue the first, wait a bounded grace period, and only issue the second if
//! the first has not yet answered. The call then resolves to whichever answer
//! arrives first, bounded by an overall deadline. This avoids doubling load on
//! every call while still bounding worst-case latency.
//!
//! # Components
//!
//! - [`ResponseSlot`] - race-free container storing at most one successful
//!   value (first write wins) plus a last-write-wins error
//! - [`CompletionGate`] - single-shot, multi-writer signal that a slot is
//!   ready to read
//! - [`HedgedOperation`] - the contract an operation must satisfy to be
//!   hedged: start asynchronously, stop best-effort
//! - [`HedgeCoordinator`] - the two-phase state machine tying them together
//!
//! # Example
//!
//! ```no_run
//! use hedgeline_core::{coordinate, HedgedOperation};
//! use std::time::Duration;
//!
//! # async fn example(primary: &dyn HedgedOperation<u32>, fallback: &dyn HedgedOperation<u32>)
//! #     -> hedgeline_core::Result<()> {
//! let value = coordinate(
//!     primary,
//!     fallback,
//!     Duration::from_millis(800),
//!     Duration::from_secs(5),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Latency/correctness trade-off
//!
//! In the hedged phase both operations write into one shared slot, and the
//! coordinator reads the slot the moment the gate opens. If the first writer
//! to open the gate reported an error while the other writer was still racing
//! to deliver a value, that value is lost. This is a deliberate choice in
//! favor of bounded latency; see [`HedgeCoordinator`] for details.

pub mod coordinator;
pub mod error;
pub mod gate;
pub mod operation;
pub mod slot;

pub use coordinator::{coordinate, HedgeConfig, HedgeCoordinator};
pub use error::{BoxError, HedgeError, Result};
pub use gate::CompletionGate;
pub use operation::HedgedOperation;
pub use slot::ResponseSlot;
