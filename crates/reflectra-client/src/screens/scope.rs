//! Mount/unmount lifecycle shared by every screen.
//!
//! A [`Scoped`] pairs a screen's state with a cancellation token. Pending
//! backend calls are raced against the token, and every state write
//! re-checks the token under the state lock. [`Scoped::unmount`] cancels
//! while holding that same lock, so once it returns no write can land.

use std::future::Future;

use parking_lot::Mutex;
use reflectra_shared::ReflectraError;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// State types that can show an inline notice.
pub trait ScreenState {
    fn notice_mut(&mut self) -> &mut Option<String>;
}

#[derive(Debug)]
pub struct Scoped<S> {
    token: CancellationToken,
    state: Mutex<S>,
    revision: watch::Sender<u64>,
}

impl<S: ScreenState> Scoped<S> {
    pub fn new(state: S) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            token: CancellationToken::new(),
            state: Mutex::new(state),
            revision,
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Await `fut` unless the screen unmounts first. `None` means it did.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }

    /// Apply a state change if still mounted. Bumps the revision on success.
    pub fn apply<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let mut state = self.state.lock();
        if self.token.is_cancelled() {
            return None;
        }
        let out = f(&mut state);
        drop(state);
        self.revision.send_modify(|r| *r += 1);
        Some(out)
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.lock())
    }

    /// Log a failure and show it inline.
    pub fn report(&self, context: &'static str, err: &ReflectraError) {
        warn!(context, error = %err, "screen operation failed");
        let message = err.user_message();
        self.apply(|s| *s.notice_mut() = Some(message));
    }

    pub fn clear_notice(&self) {
        self.apply(|s| *s.notice_mut() = None);
    }

    pub fn notice(&self) -> Option<String> {
        self.state.lock().notice_mut().clone()
    }

    /// Receiver that changes whenever the state does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Cancel pending work and run `teardown` on the final state.
    pub fn unmount(&self, teardown: impl FnOnce(&mut S)) {
        let mut state = self.state.lock();
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        teardown(&mut state);
    }
}

/// Run a mutating call within the scope, mapping an unmount to `Cancelled`
/// and reporting failures inline.
pub(crate) async fn scoped_call<S, T, F>(
    scoped: &Scoped<S>,
    context: &'static str,
    fut: F,
) -> Result<T, ReflectraError>
where
    S: ScreenState,
    F: Future<Output = Result<T, ReflectraError>>,
{
    match scoped.run(fut).await {
        None => Err(ReflectraError::Cancelled),
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => {
            scoped.report(context, &err);
            Err(err)
        }
    }
}
