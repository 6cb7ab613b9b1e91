use std::collections::HashSet;
use std::sync::OnceLock;

use crate::frame::Frame;

/// (defining type, member) pairs which the host runtime reports as runnable
/// while the thread is in fact parked in a blocking kernel primitive.
/// Extending this list to a newly discovered idle primitive is a maintenance
/// action; it is never derived at runtime.
fn idle_calls() -> &'static HashSet<(&'static str, &'static str)> {
    static IDLE_CALLS: OnceLock<HashSet<(&'static str, &'static str)>> = OnceLock::new();
    IDLE_CALLS.get_or_init(|| {
        HashSet::from([
            ("libc", "epoll_wait"),
            ("libc", "epoll_pwait"),
            ("libc", "kevent"),
            ("libc", "recv"),
            ("libc", "send"),
            ("libc", "accept"),
            ("libc", "accept4"),
        ])
    })
}

/// True if the frame is a known blocking I/O call that misreports as
/// runnable. Callers apply this to the innermost frame of a captured stack,
/// and only when sampling the runnable state; other states do not exhibit
/// the false positive.
pub fn is_idle_frame(frame: &Frame) -> bool {
    idle_calls().contains(&(frame.defining_type.as_str(), frame.member_name.as_str()))
}
