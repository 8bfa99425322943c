//! Real SIGINT/SIGTERM delivery to the bridge and to a running manager.
//!
//! Signals go to the whole process, so these live in their own test binary.
#![cfg(unix)]

use std::process::Command;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use jobloop_core::app::CancellationBridge;
use jobloop_core::impls::{demo_jobs, handler_fn};
use jobloop_core::{Job, JobSource, ManagerConfig, StopReason, TaskError, TaskManager};
use tokio_util::sync::CancellationToken;

fn send_to_self(signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(std::process::id().to_string())
        .status()
        .expect("failed to run kill");
    assert!(status.success(), "kill -{signal} failed: {status}");
}

#[tokio::test]
async fn sigint_right_after_install_cancels() {
    let token = CancellationToken::new();
    let listener = CancellationBridge::new(token.clone()).install().unwrap();

    send_to_self("INT");

    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .expect("SIGINT did not reach the token");
    listener.abort();
}

#[tokio::test]
async fn sigterm_right_after_install_cancels() {
    let token = CancellationToken::new();
    let listener = CancellationBridge::new(token.clone()).install().unwrap();

    send_to_self("TERM");

    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .expect("SIGTERM did not reach the token");
    listener.abort();
}

#[test]
fn sigterm_stops_blocking_start_during_idle_wait() {
    let (started_tx, started_rx) = mpsc::channel();
    let handler = handler_fn(move |_job: Job| -> Result<(), TaskError> {
        let _ = started_tx.send(());
        Ok(())
    });
    let config = ManagerConfig {
        idle_delay: 600,
        ..ManagerConfig::default()
    };
    let mut manager = TaskManager::new(config, JobSource::sequence(demo_jobs(1)), Arc::new(handler));

    // the first job runs after the bridge is installed
    let killer = thread::spawn(move || {
        if started_rx.recv().is_ok() {
            send_to_self("TERM");
        }
    });

    let summary = manager.blocking_start().unwrap();
    assert!(manager.quit());
    // drops the handler's sender so the killer cannot wait forever
    drop(manager);
    killer.join().unwrap();

    assert_eq!(summary.stop_reason, StopReason::Cancelled);
    assert!(summary.dispatched <= 1);
}
