use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use jobloop_core::impls::{JsonLinesSource, demo_jobs};
use jobloop_core::{Job, JobSource, ManagerConfig, TaskError, TaskHandler, TaskManager};

#[derive(Parser, Debug)]
#[command(name = "jobloop", about = "Poll a job source and run each job in order")]
struct CliArgs {
    /// TOML config file (idle_delay, quit_on_empty_queue, wait_log_interval).
    #[clap(long)]
    config: Option<PathBuf>,

    /// Seconds to sleep when there is nothing to do.
    #[clap(long)]
    idle_delay: Option<u64>,

    /// Stop on the first "no work" instead of sleeping.
    #[clap(long)]
    quit_on_empty_queue: bool,

    /// Seconds between "still idle" log lines (0 = off).
    #[clap(long)]
    wait_log_interval: Option<u64>,

    /// JSON-lines job file, `-` for stdin. Without it a demo source is used.
    #[clap(long)]
    input: Option<PathBuf>,

    /// Number of jobs the demo source yields before going idle.
    #[clap(long, default_value_t = 10)]
    jobs: u64,

    /// Make every n-th job fail, to watch the loop keep going.
    #[clap(long)]
    fail_every: Option<u64>,
}

/// Logs each job; optionally fails every n-th one.
struct EchoHandler {
    fail_every: Option<u64>,
    seen: AtomicU64,
}

impl EchoHandler {
    fn new(fail_every: Option<u64>) -> Self {
        Self {
            fail_every: fail_every.filter(|n| *n > 0),
            seen: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl TaskHandler for EchoHandler {
    async fn handle(&self, job: Job) -> Result<(), TaskError> {
        let n = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(every) = self.fail_every
            && n % every == 0
        {
            return Err(format!("intentional failure (job #{n})").into());
        }

        info!(
            args = %serde_json::Value::Array(job.args),
            kwargs = %serde_json::Value::Object(job.kwargs),
            "handled job #{n}"
        );
        Ok(())
    }
}

fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();
}

fn load_config(args: &CliArgs) -> Result<ManagerConfig, jobloop_core::domain::ConfigError> {
    let mut config = match &args.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };

    // CLI の値がファイルより優先
    if let Some(idle_delay) = args.idle_delay {
        config.idle_delay = idle_delay;
    }
    if args.quit_on_empty_queue {
        config.quit_on_empty_queue = true;
    }
    if let Some(interval) = args.wait_log_interval {
        config.wait_log_interval = interval;
    }
    Ok(config)
}

fn job_source(args: &CliArgs) -> JobSource {
    match args.input.clone() {
        Some(path) if path.as_os_str() == "-" => {
            JobSource::factory(|| Ok(JsonLinesSource::new(BufReader::new(std::io::stdin()))))
        }
        // ファイルは開始時に開く。開けなければ起動失敗
        Some(path) => JobSource::factory(move || {
            let file = File::open(&path)?;
            Ok(JsonLinesSource::new(BufReader::new(file)))
        }),
        None => JobSource::sequence(demo_jobs(args.jobs)),
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let handler = Arc::new(EchoHandler::new(args.fail_every));
    let mut manager = TaskManager::new(config, job_source(&args), handler);

    match manager.blocking_start() {
        Ok(summary) => {
            info!(
                dispatched = summary.dispatched,
                succeeded = summary.succeeded,
                failed = summary.failed,
                idle_waits = summary.idle_waits,
                stop_reason = ?summary.stop_reason,
                "task manager stopped"
            );
            ExitCode::from(summary.exit_code())
        }
        Err(e) => {
            error!("task manager failed: {e}");
            ExitCode::FAILURE
        }
    }
}
