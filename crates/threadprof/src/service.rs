use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;

use crate::error::ProfileError;
use crate::introspection::{ThreadIntrospector, ThreadState};
use crate::pprof_serializer::{process_binary_name, PprofSerializer};
use crate::sampler::Sampler;

/// Content type of the encoded payload, for callers that speak HTTP.
pub const CONTENT_TYPE_PPROF: &str = "pprof/raw";

pub const DEFAULT_DURATION: Duration = Duration::from_secs(10);
pub const DEFAULT_FREQUENCY_HZ: u32 = 100;

/// At most one sampling run may be in flight process-wide. Concurrent runs
/// would contend for the same thread-introspection machinery and distort
/// both profiles' CPU attribution, so a second request fails fast instead
/// of queuing.
static PROFILE_IN_FLIGHT: AtomicBool = AtomicBool::new(false);

struct InFlightGuard;

impl InFlightGuard {
    fn acquire() -> Result<Self, ProfileError> {
        if PROFILE_IN_FLIGHT
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(InFlightGuard)
        } else {
            Err(ProfileError::AlreadyActive)
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        PROFILE_IN_FLIGHT.store(false, Ordering::Release);
    }
}

/// Request-level entry points: turns (duration, frequency) requests into
/// encoded profile bytes. This is the surface an HTTP handler calls into;
/// transport stays out of this crate.
pub struct ProfileService<I> {
    introspector: I,
    binary_name: String,
}

impl<I: ThreadIntrospector> ProfileService<I> {
    pub fn new(introspector: I) -> Self {
        Self::with_binary_name(introspector, process_binary_name())
    }

    /// Override the owning-binary name written into the symbol preamble.
    pub fn with_binary_name(introspector: I, binary_name: impl Into<String>) -> Self {
        Self {
            introspector,
            binary_name: binary_name.into(),
        }
    }

    /// Sample runnable threads and return the encoded profile bytes.
    /// `None` falls back to 10 seconds / 100 Hz.
    pub fn profile(
        &self,
        duration: Option<Duration>,
        frequency: Option<u32>,
    ) -> Result<Vec<u8>, ProfileError> {
        self.run(duration, frequency, ThreadState::Runnable)
    }

    /// Sample threads blocked on contention, same defaults.
    pub fn contention(
        &self,
        duration: Option<Duration>,
        frequency: Option<u32>,
    ) -> Result<Vec<u8>, ProfileError> {
        self.run(duration, frequency, ThreadState::Blocked)
    }

    fn run(
        &self,
        duration: Option<Duration>,
        frequency: Option<u32>,
        state: ThreadState,
    ) -> Result<Vec<u8>, ProfileError> {
        let _guard = InFlightGuard::acquire()?;

        let sampler = Sampler::new(&self.introspector);
        let profile = sampler.record(
            duration.unwrap_or(DEFAULT_DURATION),
            frequency.unwrap_or(DEFAULT_FREQUENCY_HZ),
            state,
        )?;

        let mut bytes = Vec::new();
        PprofSerializer::new(&self.binary_name).serialize(&profile, &mut bytes)?;
        debug!(
            "encoded {:?} profile: {} distinct stacks, {} bytes",
            state,
            profile.counts.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::introspection::{ThreadId, ThreadSnapshot};
    use std::sync::{Mutex, OnceLock};

    /// The in-flight flag is process-global; tests touching it take this
    /// lock so the harness cannot interleave them.
    fn guard_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[derive(Clone)]
    struct OneRunnable;

    impl ThreadIntrospector for OneRunnable {
        fn dump_all(&self) -> Vec<ThreadSnapshot> {
            vec![ThreadSnapshot {
                id: 7,
                name: "worker".to_owned(),
                state: ThreadState::Runnable,
                frames: vec![Frame::new("app", "crunch", "app.rs", 12)],
            }]
        }

        fn current_id(&self) -> ThreadId {
            1
        }
    }

    #[test]
    fn test_profile_returns_encoded_bytes_and_releases_the_guard() {
        let _serial = guard_lock().lock().unwrap();

        let service = ProfileService::with_binary_name(OneRunnable, "testbin");
        let bytes = service
            .profile(Some(Duration::from_millis(50)), Some(100))
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("--- symbol\nbinary=testbin\n"));
        assert!(text.contains("app::crunch"));

        // A successful run released the guard; the next request proceeds.
        service
            .contention(Some(Duration::from_millis(20)), Some(100))
            .unwrap();
    }

    #[test]
    fn test_second_request_fails_fast_while_one_is_in_flight() {
        let _serial = guard_lock().lock().unwrap();

        let first = std::thread::spawn(|| {
            let service = ProfileService::with_binary_name(OneRunnable, "testbin");
            service.profile(Some(Duration::from_millis(300)), Some(100))
        });

        // Wait until the first request holds the guard.
        while !PROFILE_IN_FLIGHT.load(Ordering::Acquire) {
            std::thread::yield_now();
        }

        let service = ProfileService::with_binary_name(OneRunnable, "testbin");
        let started = std::time::Instant::now();
        match service.profile(Some(Duration::from_millis(300)), Some(100)) {
            Err(ProfileError::AlreadyActive) => {}
            other => panic!("expected contention error, got {:?}", other.map(|b| b.len())),
        }
        // Fail-fast, not queued behind the in-flight run.
        assert!(started.elapsed() < Duration::from_millis(250));

        // The rejection did not disturb the in-flight run.
        let bytes = first.join().unwrap().unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_invalid_frequency_rejected_before_sampling_and_guard_released() {
        let _serial = guard_lock().lock().unwrap();

        let service = ProfileService::with_binary_name(OneRunnable, "testbin");
        let started = std::time::Instant::now();
        match service.profile(Some(Duration::from_secs(10)), Some(1001)) {
            Err(ProfileError::Frequency { requested }) => assert_eq!(requested, 1001),
            other => panic!("expected frequency error, got {:?}", other.map(|b| b.len())),
        }
        // Rejected before any sampling began.
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!PROFILE_IN_FLIGHT.load(Ordering::Acquire));
    }
}
