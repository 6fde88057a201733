//! Outbound ポート: アプリが外界（FS・時刻・環境変数・ログ・推論エンジン）を使うための trait

pub mod clock;
pub mod env_resolver;
pub mod fs;
pub mod log;

pub use crate::llm::engine::InferenceEngine;
pub use crate::sink::EventSink;
pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use fs::{FileMetadata, FileSystem};
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
