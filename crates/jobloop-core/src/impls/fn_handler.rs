//! Closure-backed handlers.

use async_trait::async_trait;

use crate::domain::Job;
use crate::ports::{TaskError, TaskHandler};

/// Wraps a synchronous closure as a `TaskHandler`.
pub struct FnHandler<F> {
    f: F,
}

/// Build a handler from a closure.
///
/// ```ignore
/// let handler = handler_fn(|job: Job| {
///     println!("args={:?}", job.args);
///     Ok(())
/// });
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(Job) -> Result<(), TaskError> + Send + Sync + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F> TaskHandler for FnHandler<F>
where
    F: Fn(Job) -> Result<(), TaskError> + Send + Sync + 'static,
{
    async fn handle(&self, job: Job) -> Result<(), TaskError> {
        (self.f)(job)
    }
}

/// Accepts every job and does nothing. Placeholder to show the API.
pub struct NoopHandler;

#[async_trait]
impl TaskHandler for NoopHandler {
    async fn handle(&self, _job: Job) -> Result<(), TaskError> {
        Ok(())
    }
}
