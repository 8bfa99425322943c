//! Ports - ループと外部コラボレータの境界
//!
//! - **JobSource**: ジョブ列の供給元（シーケンス / factory / config-aware factory）
//! - **TaskHandler**: ジョブを 1 件実行する capability

pub mod job_source;
pub mod task_handler;

pub use self::job_source::{JobIter, JobSource, SourceError};
pub use self::task_handler::{TaskError, TaskHandler};
