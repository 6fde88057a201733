//! lchat の実行モード（Command Pattern）

use common::config::GenerationErrorPolicy;
use common::llm::BackendKind;
use std::path::PathBuf;

/// CLI から渡された上書き値（None は「設定ファイル・デフォルトのまま」）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub model_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub server_url: Option<String>,
    pub template: Option<String>,
    pub system: Option<String>,
    pub history_cap: Option<usize>,
    pub on_error: Option<GenerationErrorPolicy>,
    /// true のときだけ上書きする
    pub stats: bool,
}

/// lchat の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// ヘルプ表示
    Help,
    /// テンプレート名の一覧
    ListTemplates,
    /// 対話セッション
    Chat(ChatOptions),
}
