//! JobSource port - ジョブ列の供給元
//!
//! 呼び出し側が構築時に variant を明示的に選ぶ。
//! 実行開始時に一度だけ `resolve()` され、途中で再評価されることはない。

use crate::domain::{JobDescriptor, ManagerConfig};
use crate::error::ManagerError;

/// Lazy, possibly infinite stream of job descriptors.
pub type JobIter = Box<dyn Iterator<Item = JobDescriptor> + Send>;

/// Failure reported by a job source factory.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

type Factory = Box<dyn FnOnce() -> Result<JobIter, SourceError> + Send>;
type ConfigFactory = Box<dyn FnOnce(&ManagerConfig) -> Result<JobIter, SourceError> + Send>;

/// Where the dispatch loop pulls its jobs from.
///
/// # 使用例
/// ```ignore
/// // already-built sequence
/// JobSource::sequence(vec![Job::from_args(vec![json!(1)])]);
///
/// // factory that needs the manager config (e.g. to open a connection)
/// JobSource::with_config(|config| Ok(my_queue_reader(config)?));
/// ```
pub enum JobSource {
    /// A ready-made sequence.
    Sequence(JobIter),

    /// Zero-argument factory producing the sequence.
    Factory(Factory),

    /// Factory that receives the manager's configuration.
    ConfigFactory(ConfigFactory),
}

impl JobSource {
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<JobDescriptor> + 'static,
        I::IntoIter: Send + 'static,
    {
        JobSource::Sequence(boxed(items))
    }

    pub fn factory<F, I>(factory: F) -> Self
    where
        F: FnOnce() -> Result<I, SourceError> + Send + 'static,
        I: IntoIterator,
        I::Item: Into<JobDescriptor> + 'static,
        I::IntoIter: Send + 'static,
    {
        JobSource::Factory(Box::new(move || factory().map(boxed)))
    }

    pub fn with_config<F, I>(factory: F) -> Self
    where
        F: FnOnce(&ManagerConfig) -> Result<I, SourceError> + Send + 'static,
        I: IntoIterator,
        I::Item: Into<JobDescriptor> + 'static,
        I::IntoIter: Send + 'static,
    {
        JobSource::ConfigFactory(Box::new(move |config: &ManagerConfig| {
            factory(config).map(boxed)
        }))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JobSource::Sequence(_) => "sequence",
            JobSource::Factory(_) => "factory",
            JobSource::ConfigFactory(_) => "config_factory",
        }
    }

    /// Turn the source into the concrete job stream.
    ///
    /// Factory errors are fatal for the run and reported as `SourceResolution`.
    pub fn resolve(self, config: &ManagerConfig) -> Result<JobIter, ManagerError> {
        let kind = self.kind();
        let jobs = match self {
            JobSource::Sequence(iter) => Ok(iter),
            JobSource::Factory(factory) => factory(),
            JobSource::ConfigFactory(factory) => factory(config),
        }
        .map_err(|source| ManagerError::SourceResolution { kind, source })?;

        tracing::debug!(kind, "job source resolved");
        Ok(jobs)
    }
}

impl std::fmt::Debug for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("JobSource").field(&self.kind()).finish()
    }
}

fn boxed<I>(items: I) -> JobIter
where
    I: IntoIterator,
    I::Item: Into<JobDescriptor> + 'static,
    I::IntoIter: Send + 'static,
{
    Box::new(items.into_iter().map(Into::into))
}
