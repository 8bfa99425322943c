//! ResponsiveSleeper - キャンセルに即応する idle 待機
//!
//! 長い sleep を 1 秒刻みに分割し、各刻みをキャンセルと競合させる。
//! 停止要求への反応は idle_delay の長さに関係なく 1 秒以内。

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Completed,
    Cancelled,
}

pub struct ResponsiveSleeper {
    cancel: CancellationToken,

    /// Seconds between progress lines; 0 = silent.
    log_interval: u64,
}

impl ResponsiveSleeper {
    pub fn new(cancel: CancellationToken, log_interval: u64) -> Self {
        Self {
            cancel,
            log_interval,
        }
    }

    /// Sleep for `seconds` whole seconds unless cancelled first.
    pub async fn sleep(&self, seconds: u64, reason: &str) -> SleepOutcome {
        for elapsed in 0..seconds {
            if self.cancel.is_cancelled() {
                return SleepOutcome::Cancelled;
            }
            if self.log_interval > 0 && elapsed % self.log_interval == 0 {
                info!("{reason}: {elapsed}sec of {seconds}sec");
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return SleepOutcome::Cancelled,
                _ = tokio::time::sleep(TICK) => {}
            }
        }
        SleepOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn completes_after_full_duration() {
        let sleeper = ResponsiveSleeper::new(CancellationToken::new(), 0);
        let started = Instant::now();

        let outcome = sleeper.sleep(5, "testing").await;

        assert_eq!(outcome, SleepOutcome::Completed);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5), "elapsed={elapsed:?}");
        assert!(elapsed < Duration::from_secs(6), "elapsed={elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_seconds_returns_immediately() {
        let sleeper = ResponsiveSleeper::new(CancellationToken::new(), 1);
        let started = Instant::now();

        assert_eq!(sleeper.sleep(0, "testing").await, SleepOutcome::Completed);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_cuts_long_wait_short() {
        let token = CancellationToken::new();
        let sleeper = ResponsiveSleeper::new(token.clone(), 10);
        let started = Instant::now();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            token.cancel();
        });

        let outcome = sleeper.sleep(60, "there is nothing to do").await;
        canceller.await.unwrap();

        assert_eq!(outcome, SleepOutcome::Cancelled);
        assert!(started.elapsed() <= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_does_not_sleep() {
        let token = CancellationToken::new();
        token.cancel();
        let sleeper = ResponsiveSleeper::new(token, 0);
        let started = Instant::now();

        assert_eq!(sleeper.sleep(30, "testing").await, SleepOutcome::Cancelled);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
