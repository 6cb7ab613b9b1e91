use std::str::FromStr;

use crate::frame::Frame;

pub type ThreadId = u64;

/// Execution state of a thread as reported by the host runtime.
///
/// The runtime's notion of `Runnable` can disagree with the kernel's; see
/// `idle::is_idle_frame` for the correction applied during sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ThreadState {
    Runnable,
    Sleeping,
    Waiting,
    Blocked,
}

impl FromStr for ThreadState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "runnable" => Ok(Self::Runnable),
            "sleeping" => Ok(Self::Sleeping),
            "waiting" => Ok(Self::Waiting),
            "blocked" => Ok(Self::Blocked),
            _ => Err(()),
        }
    }
}

/// A point-in-time observation of one live thread.
#[derive(Clone, Debug)]
pub struct ThreadSnapshot {
    pub id: ThreadId,
    pub name: String,
    pub state: ThreadState,
    /// Captured call stack, innermost frame first. May be empty when the
    /// runtime had no stack for the thread at dump time.
    pub frames: Vec<Frame>,
}

/// The host runtime's thread-introspection capability.
///
/// `dump_all` must be a lightweight pass over all live threads: no
/// per-thread locks taken, no deadlock detection triggered. `current_id`
/// identifies the calling thread in the same id space as the snapshots so
/// the sampler can discount its own stacks.
pub trait ThreadIntrospector {
    fn dump_all(&self) -> Vec<ThreadSnapshot>;
    fn current_id(&self) -> ThreadId;
}

impl<T: ThreadIntrospector + ?Sized> ThreadIntrospector for &T {
    fn dump_all(&self) -> Vec<ThreadSnapshot> {
        (**self).dump_all()
    }

    fn current_id(&self) -> ThreadId {
        (**self).current_id()
    }
}
