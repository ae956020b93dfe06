//! Outcome classification. Pure: no clock reads, no IO.

use std::time::Duration;

use waitstep_types::{CancelledOutput, SuccessOutput, WaitOutcome, WaitSeconds};

/// Build the outcome for a finished wait.
///
/// `signaled` wins regardless of `elapsed`: a gate observed armed at
/// classification time is always `Cancelled`, even at or past the deadline.
#[must_use]
pub fn classify(requested: WaitSeconds, signaled: bool, elapsed: Duration) -> WaitOutcome {
    let actual_wait_seconds = elapsed.as_secs_f64();
    if signaled {
        WaitOutcome::Cancelled(CancelledOutput {
            error: format!(
                "Aborted {actual_wait_seconds:.2} seconds after being scheduled to wait for {requested} seconds."
            ),
            actual_wait_seconds,
        })
    } else {
        WaitOutcome::Success(SuccessOutput {
            message: format!(
                "Waited {actual_wait_seconds:.2} seconds after being scheduled to wait for {requested} seconds."
            ),
            actual_wait_seconds,
        })
    }
}
