use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A spawned task tied to the lifetime of its owner.
///
/// Dropping or cancelling the handle trips the token handed to the task; the
/// task decides how to honor it (bail out early, or finish and stay silent).
#[derive(Debug)]
pub struct ScopedTask {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl ScopedTask {
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let join = tokio::spawn(f(cancel.clone()));
        Self { cancel, join }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for ScopedTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
