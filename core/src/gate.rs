//! Invocation-scoped cancellation gate.
//!
//! A gate is a one-shot flag paired with a wake-up channel. Whatever context
//! delivers cancellation (a signal listener task, a host callback, another
//! thread) holds a [`CancelHandle`]; the invocation awaits
//! [`CancellationGate::signaled`] alongside its timer.
//!
//! Gates are never shared between invocations. Construct a fresh one for every
//! invocation; there is no reset.

use std::sync::Arc;

use tokio::sync::watch;

/// Flag + wake primitive for a single invocation.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct CancellationGate {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationGate {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Arm the gate and wake every waiter.
    ///
    /// Idempotent. Returns `true` only for the call that armed the gate.
    pub fn signal(&self) -> bool {
        arm(&self.tx)
    }

    #[must_use]
    pub fn is_signaled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the gate is signaled; immediately if it already is.
    pub async fn signaled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|signaled| *signaled).await.is_err() {
            // The sender lives as long as `self`, so this is unreachable in
            // practice. Never report a cancellation that did not happen.
            std::future::pending::<()>().await;
        }
    }

    /// Capability to cancel this gate from another context.
    #[must_use]
    pub fn handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.tx),
        }
    }
}

/// Cancel-only view of a [`CancellationGate`].
///
/// Every trigger (OS signal, host request) goes through [`CancelHandle::cancel`],
/// so the outcome never depends on which trigger fired.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Same semantics as [`CancellationGate::signal`].
    pub fn cancel(&self) -> bool {
        arm(&self.tx)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

fn arm(tx: &watch::Sender<bool>) -> bool {
    let armed = tx.send_if_modified(|signaled| {
        if *signaled {
            false
        } else {
            *signaled = true;
            true
        }
    });
    if armed {
        tracing::debug!("Cancellation gate signaled");
    }
    armed
}
