//! Impls - ports の標準実装
//!
//! - **handler_fn / NoopHandler**: クロージャ・プレースホルダの TaskHandler
//! - **demo_jobs**: 動作確認用のジョブ列
//! - **JsonLinesSource**: JSON-lines を読むジョブソース

pub mod demo;
pub mod fn_handler;
pub mod json_lines;

pub use self::demo::demo_jobs;
pub use self::fn_handler::{FnHandler, NoopHandler, handler_fn};
pub use self::json_lines::JsonLinesSource;
