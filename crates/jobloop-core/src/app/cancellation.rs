//! CancellationBridge - OS シグナルを協調キャンセルに変換
//!
//! Ctrl-C (SIGINT) と SIGTERM のどちらも同じ `CancellationToken` を cancel するだけ。
//! 実行中の handler や sleep の刻みには割り込まない。ループは次のチェックポイント
//! （ループ先頭 / source の read 待ち / sleep の刻みの間）で停止要求に気づく。
//! シグナルの購読は `install()` が戻る前に済ませる。
//!
//! 対象ループが登録されていない場合は、プロセスを即座に終了させる（hard abort）。

use std::fmt;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::ManagerError;

/// Exit status used when a signal arrives with no loop to stop.
pub const ABORT_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// What the bridge did with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    /// The owning loop was asked to stop.
    Cancel,
    /// No owning loop; the process should exit right away.
    Abort,
}

pub struct CancellationBridge {
    target: Option<CancellationToken>,
}

impl CancellationBridge {
    /// Bridge signals into the given loop's token.
    pub fn new(target: CancellationToken) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Bridge with no owning loop: every signal is a hard abort.
    pub fn detached() -> Self {
        Self { target: None }
    }

    pub fn on_signal(&self, signal: ShutdownSignal) -> BridgeAction {
        match &self.target {
            Some(token) => {
                info!("detected {signal}");
                token.cancel();
                BridgeAction::Cancel
            }
            None => {
                warn!("detected {signal} with no task manager to stop, aborting");
                BridgeAction::Abort
            }
        }
    }

    /// Subscribe to SIGINT/SIGTERM and spawn the listener task.
    ///
    /// Must be called from inside a tokio runtime. Both signals are registered before
    /// this returns, so the default kill behaviour is already replaced when it does.
    pub fn install(self) -> Result<JoinHandle<()>, ManagerError> {
        let mut listener = SignalListener::new().map_err(ManagerError::Signal)?;

        let handle = tokio::spawn(async move {
            while let Some(signal) = listener.recv().await {
                if self.on_signal(signal) == BridgeAction::Abort {
                    std::process::exit(ABORT_EXIT_CODE);
                }
            }
            error!("signal stream closed, shutdown signals are no longer observed");
        });
        Ok(handle)
    }
}

#[cfg(unix)]
struct SignalListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalListener {
    fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// None は stream が閉じた場合のみ
    async fn recv(&mut self) -> Option<ShutdownSignal> {
        tokio::select! {
            received = self.interrupt.recv() => received.map(|()| ShutdownSignal::Interrupt),
            received = self.terminate.recv() => received.map(|()| ShutdownSignal::Terminate),
        }
    }
}

// SIGTERM の無い Windows では Ctrl-C のみ
#[cfg(windows)]
struct SignalListener {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl SignalListener {
    fn new() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> Option<ShutdownSignal> {
        self.ctrl_c.recv().await.map(|()| ShutdownSignal::Interrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminate_and_interrupt_converge_on_same_token() {
        for signal in [ShutdownSignal::Interrupt, ShutdownSignal::Terminate] {
            let token = CancellationToken::new();
            let bridge = CancellationBridge::new(token.clone());

            assert_eq!(bridge.on_signal(signal), BridgeAction::Cancel);
            assert!(token.is_cancelled());
        }
    }

    #[test]
    fn repeated_signals_keep_token_cancelled() {
        let token = CancellationToken::new();
        let bridge = CancellationBridge::new(token.clone());

        bridge.on_signal(ShutdownSignal::Terminate);
        assert_eq!(bridge.on_signal(ShutdownSignal::Terminate), BridgeAction::Cancel);
        assert!(token.is_cancelled());
    }

    #[test]
    fn detached_bridge_aborts() {
        let bridge = CancellationBridge::detached();
        assert_eq!(bridge.on_signal(ShutdownSignal::Terminate), BridgeAction::Abort);
    }

    #[test]
    fn signal_names() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn install_subscribes_inside_runtime() {
        let token = CancellationToken::new();
        let handle = CancellationBridge::new(token.clone()).install().unwrap();

        assert!(!handle.is_finished());
        assert!(!token.is_cancelled());
        handle.abort();
    }
}
