//! llama.cpp server（`llama-server -m model.gguf`）を推論エンジンとして使う実装
//!
//! `POST {base_url}/completion` に `stream: true` で投げ、SSE の `data:` 行を Fragment に正規化する。

use crate::error::Error;
use crate::llm::engine::InferenceEngine;
use crate::llm::events::{FinishReason, Fragment, LlmEvent};
use crate::llm::sampling::SamplingConfig;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader};
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// SSE 1 行の解釈結果
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// 空行・コメント・data 以外のフィールド
    Skip,
    /// `data: [DONE]`
    Done,
    /// `data: {...}`（JSON として読めなければ Null）
    Chunk(Value),
}

pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    SseLine::Chunk(serde_json::from_str(data).unwrap_or(Value::Null))
}

/// llama.cpp server エンジン
pub struct LlamaServerEngine {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl LlamaServerEngine {
    /// サーバに接続できることを `/health` で確認してからエンジンを返す
    pub fn connect(base_url: &str) -> Result<Self, Error> {
        let base_url = base_url.trim_end_matches('/').to_string();
        // 生成の待ちは無期限（ストリームの次の単位が来るまで待つ）
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::load(format!("Failed to build HTTP client: {}", e)))?;

        let health = client
            .get(format!("{}/health", base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .map_err(|e| {
                Error::load(format!(
                    "Cannot reach llama.cpp server at {}: {}",
                    base_url, e
                ))
            })?;
        if !health.status().is_success() {
            return Err(Error::load(format!(
                "llama.cpp server at {} is not ready (HTTP {})",
                base_url,
                health.status()
            )));
        }

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `/completion` のリクエストボディ
    pub fn request_payload(prompt: &str, sampling: &SamplingConfig) -> Value {
        json!({
            "prompt": prompt,
            "n_predict": sampling.max_tokens,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p,
            "top_k": sampling.top_k,
            "min_p": sampling.min_p,
            "repeat_penalty": sampling.repeat_penalty,
            "frequency_penalty": sampling.frequency_penalty,
            "presence_penalty": sampling.presence_penalty,
            "stop": sampling.stop,
            "stream": true,
        })
    }
}

impl InferenceEngine for LlamaServerEngine {
    fn name(&self) -> &str {
        "server"
    }

    fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
        callback: &mut dyn FnMut(LlmEvent) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&Self::request_payload(prompt, sampling))
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::http(format!(
                "llama.cpp server error: HTTP {}: {}",
                status, body
            )));
        }

        read_completion_stream(BufReader::new(response), callback)
    }
}

/// `/completion` の SSE ストリームを読み、LlmEvent を順に流す
///
/// `stop: true` のチャンクで終わり、それ以降の行は読まない。`stopped_limit` なら Length。
pub fn read_completion_stream<R: BufRead>(
    reader: R,
    callback: &mut dyn FnMut(LlmEvent) -> Result<(), Error>,
) -> Result<(), Error> {
    let mut finish = FinishReason::Stop;
    for line in reader.lines() {
        let line = line.map_err(|e| Error::http(format!("Failed to read stream: {}", e)))?;
        let chunk = match parse_sse_line(&line) {
            SseLine::Skip => continue,
            SseLine::Done => break,
            SseLine::Chunk(v) => v,
        };
        if let Some(err) = chunk.get("error") {
            let msg = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::generation(format!("llama.cpp server: {}", msg)));
        }
        callback(LlmEvent::Fragment(Fragment::from_json(&chunk)))?;
        if chunk.get("stop").and_then(Value::as_bool) == Some(true) {
            if chunk.get("stopped_limit").and_then(Value::as_bool) == Some(true) {
                finish = FinishReason::Length;
            }
            break;
        }
    }

    callback(LlmEvent::Completed { finish })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_data_line() {
        let line = r#"data: {"content":"Hi","stop":false}"#;
        match parse_sse_line(line) {
            SseLine::Chunk(v) => assert_eq!(Fragment::from_json(&v).text(), "Hi"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_sse_skip_and_done() {
        assert_eq!(parse_sse_line(""), SseLine::Skip);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(parse_sse_line("event: message"), SseLine::Skip);
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
    }

    #[test]
    fn test_parse_sse_malformed_json_becomes_empty_fragment() {
        match parse_sse_line("data: {not json") {
            SseLine::Chunk(v) => assert!(Fragment::from_json(&v).is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn collect(stream: &str) -> (Result<(), Error>, Vec<LlmEvent>) {
        let mut events = Vec::new();
        let result = read_completion_stream(stream.as_bytes(), &mut |ev| {
            events.push(ev);
            Ok(())
        });
        (result, events)
    }

    #[test]
    fn test_stream_ends_at_stop_chunk() {
        let stream = concat!(
            "data: {\"content\":\"Hel\",\"stop\":false}\n",
            "\n",
            "data: {\"content\":\"lo\",\"stop\":false}\n",
            "data: {\"content\":\"\",\"stop\":true,\"stopped_eos\":true}\n",
            "data: {\"content\":\"after\",\"stop\":false}\n",
        );
        let (result, events) = collect(stream);
        assert!(result.is_ok());
        let text: String = events
            .iter()
            .filter_map(|ev| match ev {
                LlmEvent::Fragment(f) => Some(f.text().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Hello");
        assert_eq!(
            events.last(),
            Some(&LlmEvent::Completed {
                finish: FinishReason::Stop
            })
        );
    }

    #[test]
    fn test_stream_stopped_limit_is_length() {
        let stream = concat!(
            "data: {\"content\":\"a\",\"stop\":false}\n",
            "data: {\"content\":\"b\",\"stop\":true,\"stopped_limit\":true}\n",
        );
        let (result, events) = collect(stream);
        assert!(result.is_ok());
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            LlmEvent::Completed {
                finish: FinishReason::Length
            }
        );
    }

    #[test]
    fn test_stream_error_chunk_is_generation_error() {
        let stream = concat!(
            "data: {\"content\":\"par\",\"stop\":false}\n",
            "data: {\"error\":{\"code\":500,\"message\":\"context overflow\"}}\n",
            "data: {\"content\":\"tial\",\"stop\":false}\n",
        );
        let (result, events) = collect(stream);
        match result {
            Err(Error::Generation(msg)) => assert!(msg.contains("context overflow")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(events.len(), 1);
        assert!(!events
            .iter()
            .any(|ev| matches!(ev, LlmEvent::Completed { .. })));
    }

    #[test]
    fn test_stream_malformed_chunk_is_empty_fragment() {
        let stream = concat!(
            "data: {broken\n",
            "data: {\"stop\":false}\n",
            "data: {\"content\":\"ok\",\"stop\":true}\n",
        );
        let (result, events) = collect(stream);
        assert!(result.is_ok());
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], LlmEvent::Fragment(f) if f.is_empty()));
        assert!(matches!(&events[1], LlmEvent::Fragment(f) if f.is_empty()));
        assert!(matches!(&events[2], LlmEvent::Fragment(f) if f.text() == "ok"));
    }

    #[test]
    fn test_request_payload_carries_sampling() {
        let sampling = SamplingConfig::default();
        let v = LlamaServerEngine::request_payload("<|im_start|>user\nHi", &sampling);
        assert_eq!(v["n_predict"], 1024);
        assert_eq!(v["top_k"], 40);
        assert_eq!(v["stream"], true);
        assert_eq!(v["stop"].as_array().unwrap().len(), sampling.stop.len());
        assert_eq!(v["prompt"], "<|im_start|>user\nHi");
    }

    #[test]
    fn test_connect_unreachable_is_load_error() {
        // 予約済みポート 9 (discard) には通常 HTTP サーバがいない
        let result = LlamaServerEngine::connect("http://127.0.0.1:9");
        assert!(matches!(result, Err(Error::Load(_))));
    }
}
