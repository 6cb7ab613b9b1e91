use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::ProfileError;
use crate::idle::is_idle_frame;
use crate::introspection::{ThreadIntrospector, ThreadState};
use crate::profile::Profile;
use crate::stack_counts::StackCounts;

/// Hard ceiling on the sampling rate. Anything above this is likely to spend
/// more CPU observing than is being observed.
pub const MAX_FREQUENCY_HZ: u32 = 1000;

/// The timed polling loop. One `Sampler` backs one run at a time; a fresh
/// aggregation map is created per `record` call and handed off in the
/// returned `Profile`.
pub struct Sampler<I> {
    introspector: I,
    cancel: CancelToken,
}

impl<I: ThreadIntrospector> Sampler<I> {
    pub fn new(introspector: I) -> Self {
        Self {
            introspector,
            cancel: CancelToken::new(),
        }
    }

    /// A handle that aborts this sampler's in-flight run when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Sample runnable threads, the common case.
    pub fn record_runnable(
        &self,
        howlong: Duration,
        frequency: u32,
    ) -> Result<Profile, ProfileError> {
        self.record(howlong, frequency, ThreadState::Runnable)
    }

    /// Observe threads in `state` for `howlong`, snapshotting their stacks at
    /// `frequency` Hz. Per Nyquist, sampling at 100 Hz resolves any stack
    /// contributing 2% or more of the window.
    ///
    /// Ticks stay aligned to a fixed grid anchored at the start instant:
    /// when the loop falls behind, already-elapsed grid points are charged
    /// to `missed_ticks` instead of being sampled back-to-back, so over a
    /// long window the achieved rate converges to the requested one. The
    /// sampler's own thread is never sampled.
    pub fn record(
        &self,
        howlong: Duration,
        frequency: u32,
        state: ThreadState,
    ) -> Result<Profile, ProfileError> {
        if frequency == 0 || frequency > MAX_FREQUENCY_HZ {
            return Err(ProfileError::Frequency {
                requested: frequency,
            });
        }
        let period = Duration::from_millis(u64::from(1000 / frequency));
        let my_id = self.introspector.current_id();

        let mut counts = StackCounts::new();
        let mut ticks: u64 = 0;
        let mut missed_ticks: u64 = 0;

        let start = Instant::now();
        let end = start + howlong;
        let mut next = Instant::now();

        while Instant::now() < end {
            for snapshot in self.introspector.dump_all() {
                if snapshot.state != state || snapshot.id == my_id {
                    continue;
                }
                if snapshot.frames.is_empty() {
                    continue;
                }
                // The runnable state misreports threads parked in blocking
                // kernel I/O; drop those samples by their innermost frame.
                if state == ThreadState::Runnable && is_idle_frame(&snapshot.frames[0]) {
                    continue;
                }
                counts.increment(snapshot.frames);
            }
            ticks += 1;
            next += period;

            // Charge scheduling delay to the miss counter and realign to the
            // grid; a naive fixed sleep would fire a burst of back-to-back
            // ticks here and drift ever further from the requested rate.
            while next < Instant::now() && next < end {
                missed_ticks += 1;
                next += period;
            }

            let sleep = next.saturating_duration_since(Instant::now());
            if self.cancel.park_for(sleep) {
                warn!("sampling run cancelled after {} ticks", ticks);
                return Err(ProfileError::Cancelled);
            }
        }

        debug!(
            "collected {} distinct stacks ({} samples) over {} ticks, {} missed",
            counts.len(),
            counts.total(),
            ticks,
            missed_ticks
        );
        Ok(Profile {
            counts,
            elapsed: start.elapsed(),
            ticks,
            missed_ticks,
        })
    }
}

/// A background run started with `record_in_thread`.
pub struct ProfileTask {
    cancel: CancelToken,
    handle: thread::JoinHandle<Result<Profile, ProfileError>>,
}

impl ProfileTask {
    /// Abort the run at its next suspension point. The task then joins with
    /// `ProfileError::Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to finish and take its outcome.
    pub fn join(self) -> Result<Profile, ProfileError> {
        self.handle.join().expect("sampler thread panicked")
    }
}

/// Run `record` on a dedicated thread, handing back a task handle
/// immediately. Semantics are identical to the synchronous entry point once
/// the loop starts; the spawned thread is the one excluded from sampling.
pub fn record_in_thread<I>(
    introspector: I,
    howlong: Duration,
    frequency: u32,
    state: ThreadState,
) -> Result<ProfileTask, ProfileError>
where
    I: ThreadIntrospector + Send + 'static,
{
    let sampler = Sampler::new(introspector);
    let cancel = sampler.cancel_token();
    let handle = thread::Builder::new()
        .name("threadprof-sampler".to_owned())
        .spawn(move || sampler.record(howlong, frequency, state))?;
    Ok(ProfileTask { cancel, handle })
}
