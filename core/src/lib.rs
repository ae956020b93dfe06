//! Cancellable wait for waitstep.
//!
//! # Architecture
//!
//! ```text
//! host -> wait(request, gate) -> WaitController::start(duration) -> classify() -> WaitOutcome
//!                                      ^
//!                  CancelHandle::cancel() (signal listener, host callback, other thread)
//! ```
//!
//! Each invocation owns its [`CancellationGate`]. The controller races the timer
//! against the gate, reads the gate flag once after waking, and hands the
//! measurement to [`classify`].

mod classify;
mod controller;
mod gate;

pub use classify::classify;
pub use controller::{WaitController, Wake, WakeReason};
pub use gate::{CancelHandle, CancellationGate};

use waitstep_types::{WaitOutcome, WaitRequest};

/// Run one wait invocation against `gate`.
///
/// Never fails: cancellation is reported as [`WaitOutcome::Cancelled`].
pub async fn wait(request: WaitRequest, gate: &CancellationGate) -> WaitOutcome {
    let requested = request.seconds;
    tracing::info!(seconds = %requested, "Wait started");

    let wake = WaitController::new(gate)
        .start(requested.as_duration())
        .await;

    if wake.signaled_at_deadline() {
        tracing::debug!(
            elapsed = ?wake.elapsed,
            "Cancellation observed at deadline; reporting cancelled"
        );
    }

    let outcome = classify(requested, wake.signaled, wake.elapsed);
    tracing::info!(
        outcome = %outcome.tag(),
        actual_wait_seconds = outcome.actual_wait_seconds(),
        "Wait finished"
    );
    outcome
}
