//! 推論ストリームの共通イベント型
//!
//! エンジンごとの応答形式の差は adapter 層で吸収し、Fragment の列に正規化する。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ストリームの 1 単位（生成テキストの増分）
///
/// テキストを取り出せない応答は境界で `Empty` にする。欠けていても致命的エラーにはしない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    Text(String),
    Empty,
}

impl Fragment {
    /// 空文字列は Empty に寄せる
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Fragment::Empty
        } else {
            Fragment::Text(s)
        }
    }

    /// JSON チャンクからテキストを取り出す
    ///
    /// 対応する形:
    /// * llama.cpp server `/completion`: `{"content": "..."}`
    /// * completions 互換: `{"choices": [{"text": "..."}]}`
    pub fn from_json(v: &Value) -> Self {
        if let Some(s) = v.get("content").and_then(Value::as_str) {
            return Fragment::from_text(s);
        }
        let text = v
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str);
        match text {
            Some(s) => Fragment::from_text(s),
            None => Fragment::Empty,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Fragment::Text(s) => s,
            Fragment::Empty => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Fragment::Empty)
    }
}

/// ストリーム終了理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// EOS または停止シーケンス
    Stop,
    /// max_tokens に到達
    Length,
    /// Ctrl+C による中断
    Interrupted,
    Other(String),
}

impl FinishReason {
    pub fn as_str(&self) -> &str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::Interrupted => "interrupted",
            FinishReason::Other(s) => s,
        }
    }
}

/// 推論エンジンから来る正規化済みイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LlmEvent {
    Fragment(Fragment),
    Completed { finish: FinishReason },
}

impl LlmEvent {
    pub fn text(s: impl Into<String>) -> Self {
        LlmEvent::Fragment(Fragment::from_text(s))
    }
}
