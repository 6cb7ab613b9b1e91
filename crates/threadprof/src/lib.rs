//! A statistical stack-sampling profiler: snapshots the call stacks of live
//! threads over a fixed window, folds identical stacks into counts, and writes
//! the result in the legacy gperftools CPU profile format.

extern crate serde;
#[macro_use]
extern crate serde_derive;

pub mod cancel;
pub mod error;
pub mod frame;
pub mod idle;
pub mod introspection;
pub mod json_serializer;
pub mod pprof_serializer;
pub mod profile;
pub mod sampler;
pub mod service;
pub mod stack_counts;

pub use crate::cancel::CancelToken;
pub use crate::error::ProfileError;
pub use crate::frame::Frame;
pub use crate::introspection::{ThreadId, ThreadIntrospector, ThreadSnapshot, ThreadState};
pub use crate::json_serializer::JsonSerializer;
pub use crate::pprof_serializer::PprofSerializer;
pub use crate::profile::Profile;
pub use crate::sampler::{record_in_thread, ProfileTask, Sampler, MAX_FREQUENCY_HZ};
pub use crate::service::ProfileService;
pub use crate::stack_counts::{StackCounts, StackKey};

/// Route internal `log` output to stderr. Only compiled in with the `debug`
/// feature; call once at process start.
#[cfg(feature = "debug")]
pub fn init_debug_logging() {
    env_logger::builder()
        .format_timestamp(None)
        .format_module_path(false)
        .init();
}
