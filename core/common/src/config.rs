//! config.json 用の設定型
//!
//! すべてのキーは省略可能。省略時は組み込みのデフォルト値を使い、CLI 引数がさらに上書きする。

use crate::error::Error;
use crate::llm::factory::BackendKind;
use crate::llm::llama_server::DEFAULT_SERVER_URL;
use crate::llm::load_params::LoadParams;
use crate::llm::sampling::SamplingConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You're a helpful assistant; your answers are concise and precise.";

/// 履歴の最大件数の下限（system + 1 往復）
pub const MIN_HISTORY_CAP: usize = 3;

/// 生成中のエラーをどう扱うか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorPolicy {
    /// 報告して入力待ちへ戻る
    Resume,
    /// 報告して終了する
    Abort,
}

impl GenerationErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationErrorPolicy::Resume => "resume",
            GenerationErrorPolicy::Abort => "abort",
        }
    }
}

impl FromStr for GenerationErrorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resume" | "continue" => Ok(GenerationErrorPolicy::Resume),
            "abort" | "exit" => Ok(GenerationErrorPolicy::Abort),
            _ => Err(Error::invalid_argument(format!(
                "Unknown generation error policy: {}. Use resume or abort",
                s
            ))),
        }
    }
}

/// config.json のルート
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    /// モデルファイルを探すディレクトリ
    pub model_dir: PathBuf,
    /// モデルファイルの拡張子（ドットなし）
    pub model_extension: String,
    /// 未指定ならビルド構成に応じたデフォルト
    pub backend: Option<BackendKind>,
    pub server_url: String,
    /// テンプレート名（未指定ならファイル名から判定）
    pub template: Option<String>,
    pub system_prompt: String,
    pub history_cap: usize,
    /// 大文字小文字を区別しない終了キーワード
    pub exit_keywords: Vec<String>,
    pub on_generation_error: GenerationErrorPolicy,
    /// 各ターン後に fragment 数・経過時間を表示する
    pub show_stats: bool,
    pub sampling: SamplingConfig,
    pub load: LoadParams,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("gguf"),
            model_extension: "gguf".to_string(),
            backend: None,
            server_url: DEFAULT_SERVER_URL.to_string(),
            template: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_cap: 10,
            exit_keywords: vec!["exit".to_string(), "quit".to_string(), "salir".to_string()],
            on_generation_error: GenerationErrorPolicy::Resume,
            show_stats: false,
            sampling: SamplingConfig::default(),
            load: LoadParams::default(),
        }
    }
}

impl ChatConfig {
    /// JSON 文字列からパース（ファイル読みは usecase で行う）
    pub fn parse(json: &str) -> Result<Self, Error> {
        let config: ChatConfig =
            serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.unwrap_or_else(BackendKind::default_for_build)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.history_cap < MIN_HISTORY_CAP {
            return Err(Error::config(format!(
                "history_cap must be at least {} (got {})",
                MIN_HISTORY_CAP, self.history_cap
            )));
        }
        if self.model_extension.trim_start_matches('.').is_empty() {
            return Err(Error::config("model_extension must not be empty"));
        }
        self.sampling.validate().map_err(Error::config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ChatConfig::default();
        assert_eq!(c.model_dir, PathBuf::from("gguf"));
        assert_eq!(c.history_cap, 10);
        assert_eq!(c.on_generation_error, GenerationErrorPolicy::Resume);
        assert!(c.exit_keywords.contains(&"salir".to_string()));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_object_gives_defaults() {
        assert_eq!(ChatConfig::parse("{}").unwrap(), ChatConfig::default());
    }

    #[test]
    fn test_parse_overrides() {
        let json = r#"{
            "model_dir": "/models",
            "backend": "echo",
            "template": "mistral",
            "history_cap": 6,
            "on_generation_error": "abort",
            "sampling": { "temperature": 0.1 },
            "load": { "n_ctx": 4096 }
        }"#;
        let c = ChatConfig::parse(json).unwrap();
        assert_eq!(c.model_dir, PathBuf::from("/models"));
        assert_eq!(c.backend(), BackendKind::Echo);
        assert_eq!(c.template.as_deref(), Some("mistral"));
        assert_eq!(c.history_cap, 6);
        assert_eq!(c.on_generation_error, GenerationErrorPolicy::Abort);
        assert_eq!(c.load.n_ctx, 4096);
        assert_eq!(c.sampling.top_k, 40);
    }

    #[test]
    fn test_parse_rejects_unknown_key_and_bad_cap() {
        let err = ChatConfig::parse(r#"{"histroy_cap": 4}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = ChatConfig::parse(r#"{"history_cap": 1}"#).unwrap_err();
        assert!(err.to_string().contains("history_cap"));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Resume".parse::<GenerationErrorPolicy>().unwrap(), GenerationErrorPolicy::Resume);
        assert_eq!("abort".parse::<GenerationErrorPolicy>().unwrap(), GenerationErrorPolicy::Abort);
        assert!("later".parse::<GenerationErrorPolicy>().is_err());
    }
}
