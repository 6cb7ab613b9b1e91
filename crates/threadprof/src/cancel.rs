use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Cooperative cancellation for an in-flight sampling run.
///
/// Clones share one flag. The sampler parks on the token between ticks;
/// `cancel()` flips the flag and wakes the parked thread immediately, so a
/// run aborts at its next (or current) suspension point rather than at the
/// end of the window.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.shared.cancelled.lock().unwrap();
        *cancelled = true;
        self.shared.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shared.cancelled.lock().unwrap()
    }

    /// Park the calling thread for `timeout`, waking early on cancellation.
    /// Returns true if the token was cancelled (before or during the park).
    pub(crate) fn park_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.shared.cancelled.lock().unwrap();
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = self
                .shared
                .condvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap();
            cancelled = guard;
        }
        *cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_park_runs_to_timeout_when_not_cancelled() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(!token.park_for(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancel_wakes_parked_thread() {
        let token = CancelToken::new();
        let parked = token.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let cancelled = parked.park_for(Duration::from_secs(10));
            (cancelled, start.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        token.cancel();

        let (cancelled, waited) = handle.join().unwrap();
        assert!(cancelled);
        assert!(waited < Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_still_observes_cancellation() {
        let token = CancelToken::new();
        assert!(!token.park_for(Duration::ZERO));
        token.cancel();
        assert!(token.park_for(Duration::ZERO));
        assert!(token.is_cancelled());
    }
}
