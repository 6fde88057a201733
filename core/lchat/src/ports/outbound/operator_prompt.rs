//! モデル配置をオペレータに依頼する Outbound ポート

use common::error::Error;
use std::path::Path;

/// モデルを置いて Enter を押すよう促し、押されるまで待つ
pub trait OperatorPrompt {
    /// Enter で true、入力の終端（EOF）で false
    fn wait_for_model(&self, dir: &Path, extension: &str) -> Result<bool, Error>;
}
