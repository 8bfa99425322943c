//! jobloop-core
//!
//! Single-process polling task manager: pulls jobs from a pluggable source,
//! hands them to a pluggable handler one at a time, backs off when idle and
//! stops cleanly on SIGINT/SIGTERM.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Job, JobDescriptor, ManagerConfig, LoopState, RunSummary）
//! - **ports**: 抽象化レイヤー（JobSource, TaskHandler）
//! - **app**: ループ本体（TaskManager, ResponsiveSleeper, CancellationBridge）
//! - **impls**: 標準実装（handler_fn, NoopHandler, demo_jobs, JsonLinesSource）
//! - **error**: ManagerError

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::TaskManager;
pub use domain::{Job, JobDescriptor, ManagerConfig, RunSummary, StopReason};
pub use error::ManagerError;
pub use ports::{JobSource, TaskError, TaskHandler};
