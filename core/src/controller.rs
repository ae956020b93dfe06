//! The timed wait raced against a cancellation gate.

use std::time::Duration;

use tokio::time::Instant;

use crate::gate::CancellationGate;

/// Which branch of the race completed first.
///
/// Informational only; [`Wake::signaled`] decides the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The full duration elapsed.
    Elapsed,
    /// The gate fired before the timer.
    Signaled,
}

/// What the controller observed when it woke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub reason: WakeReason,
    /// Gate flag read once, after wake. Source of truth for classification.
    pub signaled: bool,
    /// Time from wait entry to wake.
    pub elapsed: Duration,
}

impl Wake {
    /// The timer won but the gate was armed by the time we looked.
    #[must_use]
    pub fn signaled_at_deadline(&self) -> bool {
        self.signaled && self.reason == WakeReason::Elapsed
    }
}

/// Runs exactly one cancellable wait against a borrowed gate.
#[derive(Debug)]
pub struct WaitController<'g> {
    gate: &'g CancellationGate,
}

impl<'g> WaitController<'g> {
    #[must_use]
    pub fn new(gate: &'g CancellationGate) -> Self {
        Self { gate }
    }

    /// Suspend until `duration` elapses or the gate is signaled.
    ///
    /// A zero duration never touches the timer. A pre-armed gate returns at once.
    pub async fn start(&self, duration: Duration) -> Wake {
        let started = Instant::now();

        let reason = if duration.is_zero() {
            WakeReason::Elapsed
        } else {
            tokio::select! {
                biased;
                () = self.gate.signaled() => WakeReason::Signaled,
                () = tokio::time::sleep(duration) => WakeReason::Elapsed,
            }
        };

        let elapsed = started.elapsed();
        let signaled = self.gate.is_signaled();
        Wake {
            reason,
            signaled,
            elapsed,
        }
    }
}
