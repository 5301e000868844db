//! Process-wide stop request.
//!
//! The Ctrl-C / SIGTERM handler calls [`ShutdownSignal::trigger`] from its own
//! thread; every blocking wait in the controller goes through
//! [`ShutdownSignal::sleep`] so it wakes immediately instead of finishing a
//! fifteen-minute reading interval first.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every sleeper.
    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stop = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !*stop {
            debug!("shutdown: requested");
        }
        *stop = true;
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for `duration` or until shutdown is requested, whichever comes
    /// first.  Returns [`Error::Interrupted`] in the latter case.
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut stop = lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *stop {
                return Err(Error::Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            // Spurious wakeups loop back through the deadline check.
            stop = cvar
                .wait_timeout(stop, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
