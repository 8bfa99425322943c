use async_trait::async_trait;

use crate::domain::Job;

/// Failure reported by a task handler. The loop logs it and moves on.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

/// Executes one job.
///
/// Takes the whole `Job` by value so the handler can decode args/kwargs as it likes.
/// An `Err` (or a panic) only drops this job; the dispatch loop keeps going.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, job: Job) -> Result<(), TaskError>;
}
