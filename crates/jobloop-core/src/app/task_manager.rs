//! TaskManager - ジョブのポーリングとディスパッチ
//!
//! # フロー
//! 1. JobSource を一度だけ resolve してジョブ列を得る
//! 2. 先頭から 1 件ずつ取り出す（順序は保存、並列化しない）
//! 3. NoWork -> idle backoff（または quit_on_empty_queue なら停止）
//! 4. Work -> handler を最後まで実行。失敗・panic はログに残して次へ
//! 5. キャンセル要求はループ先頭・source の read 待ち・sleep の刻みの間でのみ確認する。
//!    実行中の handler には割り込まない

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::app::cancellation::CancellationBridge;
use crate::app::sleeper::{ResponsiveSleeper, SleepOutcome};
use crate::domain::{Job, JobDescriptor, LoopState, ManagerConfig, RunSummary, StopReason};
use crate::error::ManagerError;
use crate::ports::{JobIter, JobSource, TaskHandler};

const IDLE_REASON: &str = "there is nothing to do";

/// Result of one read from the job source.
enum Pull {
    Item(JobDescriptor),
    Exhausted,
    Cancelled,
}

/// Single-process, serial job dispatcher.
///
/// A manager runs exactly once; afterwards `quit()` is true and the instance is done.
pub struct TaskManager {
    config: Arc<ManagerConfig>,
    source: Option<JobSource>,
    handler: Arc<dyn TaskHandler>,
    cancel: CancellationToken,
    state: LoopState,

    /// Terminal flag. Written only by the loop itself, once, on the way out.
    quit: bool,
}

/// Counters collected while the loop runs.
#[derive(Debug, Default)]
struct Tally {
    dispatched: u64,
    succeeded: u64,
    failed: u64,
    idle_waits: u64,
}

impl Tally {
    fn finish(self, stop_reason: StopReason) -> RunSummary {
        RunSummary {
            dispatched: self.dispatched,
            succeeded: self.succeeded,
            failed: self.failed,
            idle_waits: self.idle_waits,
            stop_reason,
        }
    }
}

impl TaskManager {
    pub fn new(config: ManagerConfig, source: JobSource, handler: Arc<dyn TaskHandler>) -> Self {
        debug!(?config, source = source.kind(), "TaskManager finished init");
        Self {
            config: Arc::new(config),
            source: Some(source),
            handler,
            cancel: CancellationToken::new(),
            state: LoopState::Running,
            quit: false,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Token that stops the loop when cancelled (same path as SIGINT/SIGTERM).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// True once the loop has stopped, on every shutdown path.
    pub fn quit(&self) -> bool {
        self.quit
    }

    /// Run the loop on a fresh runtime with SIGINT/SIGTERM routed into it.
    ///
    /// Blocks until shutdown. Must not be called from inside another tokio runtime.
    pub fn blocking_start(&mut self) -> Result<RunSummary, ManagerError> {
        if self.source.is_none() {
            return Err(ManagerError::AlreadyStarted);
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(ManagerError::Runtime)?;

        let result = runtime.block_on(async {
            let bridge = CancellationBridge::new(self.cancellation_token()).install()?;
            let result = self.run().await;
            bridge.abort();
            result
        });
        // 放棄した source の read が blocking pool に残っていても待たない
        runtime.shutdown_background();
        result
    }

    /// Run the loop on the current runtime. Signal wiring is up to the caller.
    pub async fn run(&mut self) -> Result<RunSummary, ManagerError> {
        let Some(source) = self.source.take() else {
            return Err(ManagerError::AlreadyStarted);
        };
        debug!("threadless start");

        let jobs = match source.resolve(&self.config) {
            Ok(jobs) => jobs,
            Err(e) => {
                self.stop();
                return Err(e);
            }
        };

        let sleeper = ResponsiveSleeper::new(self.cancel.clone(), self.config.wait_log_interval);
        let mut tally = Tally::default();
        let stop_reason = self.drive(jobs, &sleeper, &mut tally).await;

        self.stop();
        let summary = tally.finish(stop_reason);
        debug!(?summary, "TaskManager dies quietly");
        Ok(summary)
    }

    async fn drive(
        &mut self,
        jobs: JobIter,
        sleeper: &ResponsiveSleeper,
        tally: &mut Tally,
    ) -> StopReason {
        let mut jobs = Some(jobs);
        loop {
            // 停止要求を確認してから次の要素を取り出す（取り出した要素は必ず処理する）
            if self.cancel.is_cancelled() {
                return self.shutdown_requested();
            }
            let descriptor = match self.pull(&mut jobs).await {
                Pull::Item(descriptor) => descriptor,
                Pull::Exhausted => break,
                Pull::Cancelled => return self.shutdown_requested(),
            };
            debug!(job = ?descriptor, "received");

            match descriptor {
                JobDescriptor::NoWork => {
                    if self.config.quit_on_empty_queue {
                        info!("job source is empty, quitting");
                        // 手動の割り込みと同じ経路で止める
                        self.cancel.cancel();
                        self.transition(LoopState::ShuttingDown);
                        return StopReason::EmptyQueue;
                    }

                    self.transition(LoopState::IdleWait);
                    tally.idle_waits += 1;
                    info!(
                        "{IDLE_REASON}. Sleeping for {} seconds",
                        self.config.idle_delay
                    );
                    if sleeper.sleep(self.config.idle_delay, IDLE_REASON).await
                        == SleepOutcome::Cancelled
                    {
                        return self.shutdown_requested();
                    }
                    self.transition(LoopState::Running);
                }
                JobDescriptor::Work(job) => {
                    tally.dispatched += 1;
                    if self.dispatch(job).await {
                        tally.succeeded += 1;
                    } else {
                        tally.failed += 1;
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            return self.shutdown_requested();
        }
        debug!("job source exhausted");
        self.transition(LoopState::ShuttingDown);
        StopReason::SourceExhausted
    }

    /// Take the next element off the source.
    ///
    /// `next()` may block (stdin, a queue client), so it runs on the blocking pool
    /// and is raced against the token. An element that arrives is always returned,
    /// even if cancellation landed meanwhile. On cancellation a still-blocked read is
    /// abandoned together with the source.
    async fn pull(&self, slot: &mut Option<JobIter>) -> Pull {
        let Some(mut jobs) = slot.take() else {
            return Pull::Exhausted;
        };
        let mut pending = tokio::task::spawn_blocking(move || {
            let next = jobs.next();
            (next, jobs)
        });

        tokio::select! {
            biased;
            joined = &mut pending => match joined {
                Ok((Some(descriptor), jobs)) => {
                    *slot = Some(jobs);
                    Pull::Item(descriptor)
                }
                Ok((None, _)) => Pull::Exhausted,
                Err(e) => {
                    error!(error = %e, "job source failed, closing it");
                    Pull::Exhausted
                }
            },
            _ = self.cancel.cancelled() => {
                debug!("abandoning a blocked job source read");
                Pull::Cancelled
            }
        }
    }

    /// Run one job to completion. Returns false if the handler failed or panicked.
    ///
    /// The handler runs in its own task only so that a panic stays contained; we
    /// await it right away, so dispatch is still strictly serial.
    async fn dispatch(&self, job: Job) -> bool {
        let handler = Arc::clone(&self.handler);
        let context = job.clone();
        let joined = tokio::spawn(async move { handler.handle(job).await }).await;

        match joined {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(job = ?context, error = %error_chain(e.as_ref()), "Error in processing a job");
                false
            }
            Err(e) => {
                error!(job = ?context, error = %e, panicked = e.is_panic(), "job handler task failed");
                false
            }
        }
    }

    fn shutdown_requested(&mut self) -> StopReason {
        info!("dispatch loop got a quit request");
        self.transition(LoopState::ShuttingDown);
        StopReason::Cancelled
    }

    fn stop(&mut self) {
        self.transition(LoopState::Stopped);
        self.quit = true;
    }

    fn transition(&mut self, next: LoopState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "loop state");
            self.state = next;
        }
    }
}

/// `outer: inner: root` style rendering of an error and its sources.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
