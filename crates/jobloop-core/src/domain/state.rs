//! State - ディスパッチループの状態と実行結果

/// LoopState はループの状態を表現
///
/// # 状態遷移
/// - running -> idle_wait -> running （"no work" を受けたとき）
/// - running / idle_wait -> shutting_down （キャンセル・空キュー・ソース枯渇）
/// - shutting_down -> stopped （終端。戻らない）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    IdleWait,
    ShuttingDown,
    Stopped,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Manual interrupt or termination signal.
    Cancelled,

    /// `quit_on_empty_queue` was set and the source yielded "no work".
    EmptyQueue,

    /// A finite source ran out of elements.
    SourceExhausted,
}

/// Counters for one run of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub idle_waits: u64,
    pub stop_reason: StopReason,
}

impl RunSummary {
    /// Process exit status. Every way the loop can return normally is a clean shutdown.
    pub fn exit_code(&self) -> u8 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::cancelled(StopReason::Cancelled)]
    #[case::empty_queue(StopReason::EmptyQueue)]
    #[case::source_exhausted(StopReason::SourceExhausted)]
    fn every_normal_stop_exits_cleanly(#[case] stop_reason: StopReason) {
        let summary = RunSummary {
            dispatched: 3,
            succeeded: 1,
            failed: 2,
            idle_waits: 0,
            stop_reason,
        };
        assert_eq!(summary.exit_code(), 0);
    }
}
