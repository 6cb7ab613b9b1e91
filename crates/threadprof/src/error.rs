use thiserror::Error;

/// Everything a sampling run or a profile encode can fail with. None of
/// these are retried internally; a failed or cancelled run needs an explicit
/// new invocation.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Rejected before any sampling begins: above 1000 Hz the cost of
    /// sampling would dominate the observation.
    #[error("sampling frequency must be between 1 and 1000 Hz (got {requested})")]
    Frequency { requested: u32 },

    /// The run was interrupted mid-flight. No profile was produced; this is
    /// not the same outcome as a completed run with zero samples.
    #[error("sampling run was cancelled before completion")]
    Cancelled,

    /// A second run was requested while one was in flight. Concurrent runs
    /// would contend for the same thread-introspection machinery and distort
    /// both profiles' CPU attribution, so the request fails fast instead of
    /// queuing.
    #[error("only one profile request may be active at a time")]
    AlreadyActive,

    #[error("failed to write profile: {0}")]
    Io(#[from] std::io::Error),
}
