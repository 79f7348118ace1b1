//! Bridging actor code to blocking or async callers outside the system.
//!
//! A probe is an ordinary operation with a one-shot channel attached: the
//! channel fires right after the operation returns, so waiting on it also
//! waits for everything queued ahead of the operation in that inbox.
//!
//! Never wait on a probe from inside an operation. If the inbox being probed
//! is (transitively) waiting on the caller's own drain, nothing can make
//! progress.

use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::actor::Actor;
use crate::error::ProbeError;
use crate::handoff;
use crate::inbox::Inbox;

/// Completion handle for one operation sent with [`Inbox::sync_exec`].
///
/// Resolves to the operation's return value. The value is handed out once;
/// waiting again after a successful wait reports [`ProbeError::Abandoned`].
/// Can be awaited from async code.
#[must_use = "a probe does nothing unless waited on"]
#[derive(Debug)]
pub struct Probe<R = ()> {
    rx: Receiver<R>,
    taken: AtomicBool,
}

impl<R: Send + 'static> Probe<R> {
    pub(crate) fn attach<F>(inbox: &Inbox, op: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
    {
        if handoff::is_draining() {
            tracing::warn!(
                inbox = %inbox,
                current = ?handoff::current(),
                "probe created inside a drain; waiting on it can deadlock"
            );
        }

        let (tx, rx) = flume::bounded(1);
        inbox.enqueue_external(move || {
            let value = op();
            // The receiver may have been dropped by a caller that gave up.
            let _ = tx.send(value);
        });
        Self { rx, taken: AtomicBool::new(false) }
    }

    /// Whether the operation has returned (non-blocking). Stays true after
    /// the result has been taken by [`wait_timeout`](Self::wait_timeout).
    /// An operation that panicked never completes; see
    /// [`is_abandoned`](Self::is_abandoned).
    pub fn is_complete(&self) -> bool {
        self.taken.load(Ordering::Acquire) || !self.rx.is_empty()
    }

    /// Whether the operation was dropped without returning (non-blocking).
    pub fn is_abandoned(&self) -> bool {
        !self.is_complete() && self.rx.is_disconnected()
    }

    /// Blocks the current thread until the operation has run.
    pub fn wait(self) -> Result<R, ProbeError> {
        self.rx.recv().map_err(|_| ProbeError::Abandoned)
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`. A timed-out
    /// probe can be waited on again.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<R, ProbeError> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => {
                self.taken.store(true, Ordering::Release);
                Ok(value)
            }
            Err(RecvTimeoutError::Timeout) => Err(ProbeError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ProbeError::Abandoned),
        }
    }
}

impl<R: Send + 'static> IntoFuture for Probe<R> {
    type Output = Result<R, ProbeError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Probe { rx, .. } = self;
        async move { rx.into_recv_async().await.map_err(|_| ProbeError::Abandoned) }.boxed()
    }
}

/// Runs `op` on `actor` and blocks until it has returned, yielding its
/// result. Only for non-actor callers.
pub fn block<A, F, R>(actor: &A, op: F) -> Result<R, ProbeError>
where
    A: Actor + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    actor.inbox().sync_exec(op).wait()
}
