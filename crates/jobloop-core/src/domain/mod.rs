//! Domain model (job descriptors, config, loop state).

pub mod config;
pub mod job;
pub mod state;

pub use self::config::{ConfigError, ManagerConfig};
pub use self::job::{Job, JobDescriptor, Kwargs};
pub use self::state::{LoopState, RunSummary, StopReason};
