//! Scoped cancellation with a deadline.
//!
//! A [`CancelScope`] bounds any future independently of how that future's
//! client is configured. The scope can be cancelled explicitly through a
//! [`CancelHandle`], fires on its own when the deadline passes, and is always
//! released when dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::types::FailureKind;

/// Externally triggerable side of a [`CancelScope`].
///
/// Cloning is cheap; all clones observe the same scope.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    released: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancels the scope. Futures currently running under it stop with
    /// [`FailureKind::Cancelled`]. Calling this more than once is harmless.
    pub fn cancel(&self) {
        self.released.send_replace(true);
    }

    /// Whether the scope has been cancelled, expired, or dropped.
    pub fn is_released(&self) -> bool {
        *self.released.borrow()
    }
}

/// A deadline-bounded, cancellable execution scope.
#[derive(Debug)]
pub struct CancelScope {
    deadline: Option<Instant>,
    handle: CancelHandle,
}

impl CancelScope {
    /// Creates a scope that only ends when cancelled or dropped.
    pub fn new() -> Self {
        Self::with_deadline(None)
    }

    /// Creates a scope that expires `timeout` from now.
    ///
    /// A timeout too large to represent behaves like [`CancelScope::new`].
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now().checked_add(timeout))
    }

    fn with_deadline(deadline: Option<Instant>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            deadline,
            handle: CancelHandle {
                released: Arc::new(tx),
            },
        }
    }

    pub fn handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Runs `future` until it completes, the deadline passes, or the scope is
    /// cancelled, whichever happens first.
    ///
    /// Returns [`FailureKind::DeadlineExceeded`] or [`FailureKind::Cancelled`]
    /// when the future did not finish. The scope is released on expiry; running
    /// again after the deadline keeps reporting
    /// [`FailureKind::DeadlineExceeded`].
    pub async fn run<F>(&self, future: F) -> Result<F::Output, FailureKind>
    where
        F: Future,
    {
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            self.handle.cancel();
            return Err(FailureKind::DeadlineExceeded);
        }

        let mut cancelled = self.handle.released.subscribe();
        if *cancelled.borrow_and_update() {
            return Err(FailureKind::Cancelled);
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            output = future => Ok(output),
            _ = expiry => {
                self.handle.cancel();
                Err(FailureKind::DeadlineExceeded)
            }
            _ = cancelled.wait_for(|released| *released) => Err(FailureKind::Cancelled),
        }
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}
