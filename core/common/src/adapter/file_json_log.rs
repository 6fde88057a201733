//! 構造化ログの実装（ファイルへ JSONL 追記 / 標準エラーへのミラー / 何もしない）

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogRecord};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut w = self.fs.open_append(&self.path)?;
        let line = serde_json::to_string(record)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }
}

/// 内側の Log に書いたうえで標準エラーにも 1 行出す（-v 用）
pub struct StderrLog {
    inner: Arc<dyn Log>,
}

impl StderrLog {
    pub fn new(inner: Arc<dyn Log>) -> Self {
        Self { inner }
    }
}

/// `[level] layer/kind: message {fields}` 形式の 1 行
pub fn format_for_console(record: &LogRecord) -> String {
    let level = serde_json::to_value(record.level)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let mut line = format!("[{}]", level);
    match (&record.layer, &record.kind) {
        (Some(layer), Some(kind)) => line.push_str(&format!(" {}/{}:", layer, kind)),
        (Some(scope), None) | (None, Some(scope)) => line.push_str(&format!(" {}:", scope)),
        (None, None) => {}
    }
    line.push(' ');
    line.push_str(&record.message);
    if let Some(fields) = &record.fields {
        if let Ok(json) = serde_json::to_string(fields) {
            line.push(' ');
            line.push_str(&json);
        }
    }
    line
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        eprintln!("{}", format_for_console(record));
        self.inner.log(record)
    }
}

/// 何も出力しない Log 実装（テスト用・ホーム解決失敗時）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StdFileSystem;
    use crate::ports::outbound::LogLevel;

    #[test]
    fn test_noop_log() {
        let rec = LogRecord::new(LogLevel::Info, "test", "cli", "lifecycle");
        assert!(NoopLog.log(&rec).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("logs").join("lchat.jsonl");
        let log = FileJsonLog::new(Arc::new(StdFileSystem), &path);
        log.log(&LogRecord::new(LogLevel::Info, "command started", "cli", "lifecycle"))
            .unwrap();
        log.log(
            &LogRecord::new(LogLevel::Info, "turn completed", "usecase", "turn")
                .with_field("fragments", 3),
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["message"], "turn completed");
        assert_eq!(second["fields"]["fragments"], 3);
    }

    #[test]
    fn test_format_for_console() {
        let rec = LogRecord::new(LogLevel::Warn, "generation failed", "usecase", "turn")
            .with_field("policy", "resume");
        assert_eq!(
            format_for_console(&rec),
            "[warn] usecase/turn: generation failed {\"policy\":\"resume\"}"
        );
    }
}
