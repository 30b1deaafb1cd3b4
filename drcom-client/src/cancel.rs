//! Cooperative cancellation
//!
//! A signal handler only flips the flag. The state machine checks it at every
//! transition and every interval sleep wakes up early when it flips.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use drcom_core::{Error, Result};
use tokio::sync::Notify;

#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake any pending sleep
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once shutdown was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration` unless cancelled first
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a cancel in between is not lost
        notified.as_mut().enable();
        self.check()?;

        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = notified => Err(Error::Cancelled),
        }
    }
}
