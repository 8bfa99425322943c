//! Job descriptor: what the job source yields and the handler consumes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keyword arguments of a job (name -> value).
pub type Kwargs = Map<String, Value>;

/// One unit of work: positional args + keyword args.
///
/// Example (JSON form): `[["a", 17], {"x": 23}]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub args: Vec<Value>,

    #[serde(default)]
    pub kwargs: Kwargs,
}

impl Job {
    pub fn new(args: Vec<Value>, kwargs: Kwargs) -> Self {
        Self { args, kwargs }
    }

    /// Job with positional args only.
    pub fn from_args(args: Vec<Value>) -> Self {
        Self {
            args,
            kwargs: Kwargs::new(),
        }
    }

    /// Builder-style keyword argument.
    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

/// An element of the job stream.
///
/// `NoWork` は「いまは何もない」を表す sentinel。
/// ループはこれを受けると idle backoff するか、設定次第で終了する。
#[derive(Debug, Clone, PartialEq)]
pub enum JobDescriptor {
    NoWork,
    Work(Job),
}

impl JobDescriptor {
    pub fn is_no_work(&self) -> bool {
        matches!(self, JobDescriptor::NoWork)
    }
}

impl From<Job> for JobDescriptor {
    fn from(job: Job) -> Self {
        JobDescriptor::Work(job)
    }
}

impl From<Option<Job>> for JobDescriptor {
    fn from(job: Option<Job>) -> Self {
        match job {
            Some(job) => JobDescriptor::Work(job),
            None => JobDescriptor::NoWork,
        }
    }
}

/// Structural conversion from a raw JSON value.
///
/// - `null` -> `NoWork`
/// - `[[args...], {kwargs...}]` -> `Work(args, kwargs)`
/// - any other array -> the whole array is taken as args (bare tuple)
/// - anything else -> a single positional arg
impl From<Value> for JobDescriptor {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JobDescriptor::NoWork,
            Value::Array(items) => JobDescriptor::Work(job_from_array(items)),
            other => JobDescriptor::Work(Job::from_args(vec![other])),
        }
    }
}

fn job_from_array(mut items: Vec<Value>) -> Job {
    let is_pair = items.len() == 2 && items[0].is_array() && items[1].is_object();
    if !is_pair {
        return Job::from_args(items);
    }

    // 長さと型は上でチェック済み
    let kwargs = match items.pop() {
        Some(Value::Object(map)) => map,
        _ => Kwargs::new(),
    };
    let args = match items.pop() {
        Some(Value::Array(args)) => args,
        _ => Vec::new(),
    };
    Job::new(args, kwargs)
}
