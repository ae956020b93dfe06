//! Routes process signals to an invocation's cancel handle.
//!
//! Every configured signal is equivalent: each one calls
//! [`CancelHandle::cancel`], and only the first arms the gate.

use std::io;

use tokio::task::JoinHandle;
use waitstep_config::TriggerSignal;
use waitstep_core::CancelHandle;

/// Aborts the signal listeners when dropped.
#[derive(Debug, Default)]
pub(crate) struct TriggerGuard {
    listeners: Vec<JoinHandle<()>>,
}

impl TriggerGuard {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl Drop for TriggerGuard {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
    }
}

#[cfg(unix)]
pub(crate) fn install(signals: &[TriggerSignal], handle: CancelHandle) -> io::Result<TriggerGuard> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut guard = TriggerGuard::default();
    let mut seen = Vec::with_capacity(signals.len());

    for &trigger in signals {
        if seen.contains(&trigger) {
            continue;
        }
        seen.push(trigger);

        let kind = match trigger {
            TriggerSignal::Term => SignalKind::terminate(),
            TriggerSignal::Hup => SignalKind::hangup(),
            TriggerSignal::Int => SignalKind::interrupt(),
            TriggerSignal::Quit => SignalKind::quit(),
        };
        let mut stream = signal(kind)?;
        let handle = handle.clone();
        guard.listeners.push(tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if handle.cancel() {
                    tracing::info!(signal = trigger.as_str(), "Cancellation requested");
                } else {
                    tracing::debug!(signal = trigger.as_str(), "Repeated cancellation ignored");
                }
            }
        }));
    }

    tracing::debug!(count = guard.listeners.len(), "Cancellation triggers installed");
    Ok(guard)
}

#[cfg(not(unix))]
pub(crate) fn install(signals: &[TriggerSignal], handle: CancelHandle) -> io::Result<TriggerGuard> {
    let mut guard = TriggerGuard::default();

    for &trigger in signals {
        if trigger != TriggerSignal::Int {
            tracing::warn!(
                signal = trigger.as_str(),
                "Signal not supported on this platform; ignoring"
            );
        }
    }

    if signals.contains(&TriggerSignal::Int) {
        guard.listeners.push(tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if handle.cancel() {
                    tracing::info!(signal = "ctrl-c", "Cancellation requested");
                }
            }
        }));
    }

    Ok(guard)
}
