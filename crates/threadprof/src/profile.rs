use std::time::Duration;

use crate::stack_counts::StackCounts;

/// The result of one completed sampling run.
///
/// Built once when the sampling loop exits normally and never mutated
/// afterwards; a cancelled run produces no `Profile` at all. Each key in
/// `counts` is a non-empty stack, and each (tick, thread) pair contributed
/// at most one increment, so `counts.total()` never exceeds the number of
/// ticks times the number of matching threads.
#[derive(Debug)]
pub struct Profile {
    pub counts: StackCounts,
    /// Wall-clock time the run actually took, start to loop exit.
    pub elapsed: Duration,
    pub ticks: u64,
    pub missed_ticks: u64,
}
