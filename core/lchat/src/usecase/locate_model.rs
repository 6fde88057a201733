//! モデルファイルの探索（見つかるまでオペレータに配置を促す）

use crate::ports::outbound::{ModelLocator, OperatorPrompt};
use common::domain::ModelPath;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::path::Path;

/// `dir` から拡張子 `extension` のモデルを探す。
///
/// ディレクトリが無ければ作成する。見つからない間はオペレータに配置を促して再走査し、
/// 入力が終端に達したら Error::MissingArtifact を返す。
pub fn locate_model(
    locator: &dyn ModelLocator,
    operator: &dyn OperatorPrompt,
    log: &dyn Log,
    dir: &Path,
    extension: &str,
) -> Result<ModelPath, Error> {
    if !locator.dir_exists(dir) {
        locator.create_dir(dir)?;
        let _ = log.log(
            &LogRecord::new(LogLevel::Info, "model directory created", "usecase", "model")
                .with_field("dir", dir.display().to_string()),
        );
    }
    loop {
        if let Some(found) = locator.find_first(dir, extension)? {
            let _ = log.log(
                &LogRecord::new(LogLevel::Info, "model located", "usecase", "model")
                    .with_field("path", found.display().to_string()),
            );
            return Ok(found);
        }
        let _ = log.log(
            &LogRecord::new(LogLevel::Warn, "no model file, waiting for operator", "usecase", "model")
                .with_field("dir", dir.display().to_string()),
        );
        if !operator.wait_for_model(dir, extension)? {
            return Err(Error::missing_artifact(format!(
                "no .{} file in '{}'",
                extension.trim_start_matches('.'),
                dir.display()
            )));
        }
    }
}
