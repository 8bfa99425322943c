//! App - ディスパッチループと周辺コンポーネント
//!
//! # 主要コンポーネント
//! - **TaskManager**: ジョブを取り出して handler に渡すループ（blocking_start / run）
//! - **ResponsiveSleeper**: キャンセルに即応する idle 待機
//! - **CancellationBridge**: SIGINT / SIGTERM -> CancellationToken

pub mod cancellation;
pub mod sleeper;
pub mod task_manager;

pub use self::cancellation::{BridgeAction, CancellationBridge, ShutdownSignal};
pub use self::sleeper::{ResponsiveSleeper, SleepOutcome};
pub use self::task_manager::TaskManager;
