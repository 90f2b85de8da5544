//! Cancellation sources and their composition.
//!
//! An [`AbortSignal`] fires at most once and remembers the [`AbortReason`]
//! of the first abort. [`AbortSignal::timeout`] produces a timer-driven
//! source, and [`AbortSignal::any`] merges several sources into one that
//! follows whichever fires first.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::future::select_all;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

pub use flixdeck_core::AbortReason;

/// Read side of a one-shot cancellation source.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<AbortReason>>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The reason of the first abort, once fired.
    pub fn reason(&self) -> Option<AbortReason> {
        self.reason.get().copied()
    }

    /// Resolve once the signal fires.
    pub async fn aborted(&self) -> AbortReason {
        self.token.cancelled().await;
        self.reason().unwrap_or(AbortReason::Caller)
    }

    /// Fire with `reason` unless already fired. Returns `true` if this call
    /// fired the signal.
    fn abort(&self, reason: AbortReason) -> bool {
        if self.reason.set(reason).is_err() {
            return false;
        }
        self.token.cancel();
        true
    }

    /// A signal that fires with [`AbortReason::Timeout`] after `after`.
    ///
    /// Dropping the returned guard clears the timer. Must be called from
    /// within a tokio runtime.
    pub fn timeout(after: Duration) -> (AbortSignal, TimeoutGuard) {
        let signal = AbortSignal::default();
        let target = signal.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            target.abort(AbortReason::Timeout);
        });
        (signal, TimeoutGuard { timer })
    }

    /// Merge `sources` into a signal that fires the first time any of them
    /// fires, adopting that source's reason.
    ///
    /// A source that has already fired fires the result immediately. The
    /// relay stops listening to every source as soon as one fires or the
    /// returned [`ComposedSignal`] is dropped. Must be called from within a
    /// tokio runtime.
    pub fn any(sources: &[AbortSignal]) -> ComposedSignal {
        let composed = AbortSignal::default();
        let release = CancellationToken::new();

        let already = sources
            .iter()
            .find(|s| s.is_aborted())
            .map(|s| s.reason().unwrap_or(AbortReason::Caller));

        let relay = match already {
            Some(reason) => {
                composed.abort(reason);
                None
            }
            None if sources.is_empty() => None,
            None => {
                let sources = sources.to_vec();
                let target = composed.clone();
                let released = release.clone();
                Some(tokio::spawn(async move {
                    let fired = select_all(sources.iter().map(|s| Box::pin(s.aborted())));
                    tokio::select! {
                        (reason, _, _) = fired => {
                            target.abort(reason);
                        }
                        _ = released.cancelled() => {}
                    }
                }))
            }
        };

        ComposedSignal {
            signal: composed,
            relay,
            _release: release.drop_guard(),
        }
    }
}

/// Write side of an [`AbortSignal`] owned by a caller.
#[derive(Debug, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Fire the signal with [`AbortReason::Caller`]. Later calls are no-ops.
    pub fn abort(&self) {
        self.signal.abort(AbortReason::Caller);
    }
}

/// Keeps a [`AbortSignal::timeout`] timer armed; dropping it clears the timer.
#[derive(Debug)]
pub struct TimeoutGuard {
    timer: JoinHandle<()>,
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Result of [`AbortSignal::any`].
#[derive(Debug)]
pub struct ComposedSignal {
    signal: AbortSignal,
    relay: Option<JoinHandle<()>>,
    _release: DropGuard,
}

impl ComposedSignal {
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// `true` once the relay no longer holds subscriptions on its sources.
    pub fn is_detached(&self) -> bool {
        self.relay.as_ref().map_or(true, JoinHandle::is_finished)
    }
}
