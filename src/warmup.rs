//! Deduplicated warmup ping.
//!
//! A [`WarmupState`] memoizes the first warmup future it is handed. Every later caller, whether
//! it arrives while that future is in flight or after it resolved, awaits the same shared result.
//! The result is never reset: a failed warmup stays `false` for the lifetime of the state.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

type SharedPing = Shared<BoxFuture<'static, bool>>;

/// Owner of the single in-flight or completed warmup. Clones share the same slot.
#[derive(Clone, Default)]
pub struct WarmupState {
    slot: Arc<Mutex<Option<SharedPing>>>,
}

impl WarmupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the memoized warmup, starting it with `start` if this is the first call.
    ///
    /// `start` runs at most once per state; losers of a race never invoke it.
    pub async fn get_or_start<F, Fut>(&self, start: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let ping = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(ping) => ping.clone(),
                None => {
                    let ping = start().boxed().shared();
                    *slot = Some(ping.clone());
                    ping
                }
            }
        };
        ping.await
    }

    /// Whether a warmup has been started on this state.
    pub fn is_started(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// The warmup result, once it has resolved.
    pub fn outcome(&self) -> Option<bool> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|ping| ping.peek().copied())
    }
}

impl fmt::Debug for WarmupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarmupState")
            .field("started", &self.is_started())
            .field("outcome", &self.outcome())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_ping(
        calls: &Arc<AtomicUsize>,
        result: bool,
    ) -> impl FnOnce() -> BoxFuture<'static, bool> {
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                result
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_ping() {
        let state = WarmupState::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let results = futures::future::join_all(
            (0..8).map(|_| state.get_or_start(counting_ping(&calls, true))),
        )
        .await;

        assert!(results.into_iter().all(|ok| ok));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.outcome(), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn later_callers_reuse_completed_result() {
        let state = WarmupState::new();
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(state.get_or_start(counting_ping(&calls, true)).await);
        assert!(state.get_or_start(counting_ping(&calls, true)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_warmup_is_never_retried() {
        let state = WarmupState::new();
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(!state.get_or_start(counting_ping(&calls, false)).await);
        assert!(!state.get_or_start(counting_ping(&calls, true)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.outcome(), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_state_but_fresh_states_do_not() {
        let state = WarmupState::new();
        let clone = state.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        state.get_or_start(counting_ping(&calls, false)).await;
        clone.get_or_start(counting_ping(&calls, true)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let fresh = WarmupState::new();
        assert!(!fresh.is_started());
        assert!(fresh.get_or_start(counting_ping(&calls, true)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
