use thiserror::Error;

use crate::ports::job_source::SourceError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("job source could not be resolved (kind={kind}): {source}")]
    SourceResolution {
        kind: &'static str,
        #[source]
        source: SourceError,
    },

    #[error("task manager has already been started")]
    AlreadyStarted,

    #[error("failed to build async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}
