use serde_json::json;

use crate::domain::{Job, JobDescriptor};

/// Demo source: jobs `[0]` .. `[count - 1]`, then "no work" forever.
///
/// Placeholder producer to show the API; never ends on its own.
pub fn demo_jobs(count: u64) -> impl Iterator<Item = JobDescriptor> + Send + 'static {
    (0..count)
        .map(|n| JobDescriptor::Work(Job::from_args(vec![json!(n)])))
        .chain(std::iter::repeat(JobDescriptor::NoWork))
}
