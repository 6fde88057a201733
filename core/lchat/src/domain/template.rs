//! プロンプトテンプレートの種類と、モデルファイル名からの判定
//!
//! 判定は全域関数。どの規則にも当たらない名前は Generic になる。

use common::error::Error;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

/// テンプレートの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// `<|im_start|>role ... <|im_end|>`
    ChatMl,
    /// `[INST] <<SYS>> ... <</SYS>> ... [/INST]`
    Llama2,
    /// `[INST] ... [/INST]`（system なし）
    Mistral,
    /// `### Instruction:` / `### Response:`
    Alpaca,
    /// `role: content` の行
    Generic,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::ChatMl,
        TemplateKind::Llama2,
        TemplateKind::Mistral,
        TemplateKind::Alpaca,
        TemplateKind::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::ChatMl => "chatml",
            TemplateKind::Llama2 => "llama2",
            TemplateKind::Mistral => "mistral",
            TemplateKind::Alpaca => "alpaca",
            TemplateKind::Generic => "generic",
        }
    }

    /// このテンプレートで生成を止めるべき文字列（サンプリング設定の stop に足す）
    pub fn stop_sequences(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::ChatMl => &["<|im_end|>"],
            TemplateKind::Llama2 | TemplateKind::Mistral => &[],
            TemplateKind::Alpaca => &["### Instruction:"],
            TemplateKind::Generic => &["\nuser:"],
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chatml" | "chat_ml" | "chat-ml" => Ok(TemplateKind::ChatMl),
            "llama2" | "llama-2" | "llama_2" => Ok(TemplateKind::Llama2),
            "mistral" => Ok(TemplateKind::Mistral),
            "alpaca" => Ok(TemplateKind::Alpaca),
            "generic" | "raw" => Ok(TemplateKind::Generic),
            _ => Err(Error::invalid_argument(format!(
                "Unknown template: {}. Supported templates: {}",
                s,
                TemplateKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// 上から順に評価する（Mistral は Llama 系より先）
fn rules() -> &'static [(Regex, TemplateKind)] {
    static RULES: OnceLock<Vec<(Regex, TemplateKind)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"mistral|mixtral", TemplateKind::Mistral),
            (r"llama[-_ .]?2|tinyllama|vicuna|codellama", TemplateKind::Llama2),
            (r"alpaca", TemplateKind::Alpaca),
            (r"qwen|hermes|chatml|dolphin|openchat|(^|[^a-z])yi[-_]", TemplateKind::ChatMl),
        ]
        .into_iter()
        .filter_map(|(pattern, kind)| Regex::new(pattern).ok().map(|re| (re, kind)))
        .collect()
    })
}

/// モデルファイル名からテンプレートを判定する（大文字小文字は区別しない）
pub fn detect_template(file_name: &str) -> TemplateKind {
    let name = file_name.to_lowercase();
    rules()
        .iter()
        .find(|(re, _)| re.is_match(&name))
        .map(|(_, kind)| *kind)
        .unwrap_or(TemplateKind::Generic)
}
