//! Echo エンジンの実装
//!
//! 実際にはモデルを呼ばず、固定の応答を単語ごとにストリーミングします。
//! モデルファイルなしで対話ループを確認するデバッグ用です。

use crate::error::Error;
use crate::llm::engine::InferenceEngine;
use crate::llm::events::{FinishReason, LlmEvent};
use crate::llm::sampling::SamplingConfig;
use std::thread;
use std::time::Duration;

/// Echo エンジン
pub struct EchoEngine {
    delay: Duration,
}

impl EchoEngine {
    /// 単語ごとに少し待ってストリーミングらしく見せる
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(30),
        }
    }

    /// 待ち時間なし（テスト用）
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    fn reply_for(prompt: &str) -> String {
        format!(
            "[echo] Prompt received ({} chars). No model was called; this reply is streamed word by word.",
            prompt.chars().count()
        )
    }
}

impl Default for EchoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine for EchoEngine {
    fn name(&self) -> &str {
        "echo"
    }

    fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
        callback: &mut dyn FnMut(LlmEvent) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let reply = Self::reply_for(prompt);
        let mut finish = FinishReason::Stop;
        for (i, word) in reply.split_whitespace().enumerate() {
            if i as u32 >= sampling.max_tokens {
                finish = FinishReason::Length;
                break;
            }
            let piece = if i == 0 {
                word.to_string()
            } else {
                format!(" {}", word)
            };
            callback(LlmEvent::text(piece))?;
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        callback(LlmEvent::Completed { finish })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(engine: &EchoEngine, sampling: &SamplingConfig) -> (String, Vec<LlmEvent>) {
        let mut text = String::new();
        let mut events = Vec::new();
        engine
            .generate("hello", sampling, &mut |ev| {
                if let LlmEvent::Fragment(f) = &ev {
                    text.push_str(f.text());
                }
                events.push(ev);
                Ok(())
            })
            .unwrap();
        (text, events)
    }

    #[test]
    fn test_echo_engine_name() {
        assert_eq!(EchoEngine::instant().name(), "echo");
    }

    #[test]
    fn test_echo_engine_streams_words_then_completes() {
        let (text, events) = collect(&EchoEngine::instant(), &SamplingConfig::default());
        assert!(text.starts_with("[echo] Prompt received (5 chars)."));
        assert!(events.len() > 2);
        assert_eq!(
            events.last(),
            Some(&LlmEvent::Completed {
                finish: FinishReason::Stop
            })
        );
    }

    #[test]
    fn test_echo_engine_respects_max_tokens() {
        let sampling = SamplingConfig {
            max_tokens: 2,
            ..SamplingConfig::default()
        };
        let (text, events) = collect(&EchoEngine::instant(), &sampling);
        assert_eq!(text, "[echo] Prompt");
        assert_eq!(
            events.last(),
            Some(&LlmEvent::Completed {
                finish: FinishReason::Length
            })
        );
    }

    #[test]
    fn test_echo_engine_propagates_callback_error() {
        let engine = EchoEngine::instant();
        let result = engine.generate("x", &SamplingConfig::default(), &mut |_| Err(Error::Interrupted));
        assert_eq!(result, Err(Error::Interrupted));
    }
}
