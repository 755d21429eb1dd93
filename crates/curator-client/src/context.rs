//! Cancellation and deadlines for API calls
//!
//! A `Context` is threaded through every network call. Clones share the same
//! cancellation state, so cancelling any clone stops every call using it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::error::ClientError;

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation handle with an optional deadline
#[derive(Debug, Clone, Default)]
pub struct Context {
    shared: Arc<Shared>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done unless cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            shared: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
    }

    /// Why the context is done, or `None` while it is still live
    pub fn err(&self) -> Option<ClientError> {
        if self.shared.cancelled.load(Ordering::SeqCst) {
            return Some(ClientError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ClientError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed.
            let notified = self.shared.notify.notified();
            if self.shared.cancelled.load(Ordering::SeqCst) {
                return;
            }
            match self.deadline {
                Some(deadline) => tokio::select! {
                    _ = notified => {}
                    _ = tokio::time::sleep_until(deadline) => return,
                },
                None => notified.await,
            }
        }
    }
}
