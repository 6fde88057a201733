//! 生成パラメータ（セッション中は固定）

use serde::Deserialize;

/// サンプリング設定
///
/// config.json の `sampling` で一部だけ上書きできる（未指定のキーはデフォルト値）。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// nucleus sampling の累積確率
    pub top_p: f32,
    pub top_k: i32,
    pub min_p: f32,
    pub repeat_penalty: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    /// この文字列が出たら生成を止める
    pub stop: Vec<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.6,
            top_p: 0.95,
            top_k: 40,
            min_p: 0.05,
            repeat_penalty: 1.1,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
            stop: vec![
                "</s>".to_string(),
                "[INST]".to_string(),
                "[/INST]".to_string(),
                "<|im_end|>".to_string(),
            ],
        }
    }
}

impl SamplingConfig {
    /// 停止シーケンスを追加した設定を返す（重複と空文字は除く）
    pub fn with_extra_stops<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for s in extra {
            let s = s.into();
            if !s.is_empty() && !self.stop.contains(&s) {
                self.stop.push(s);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_tokens == 0 {
            return Err("sampling.max_tokens must be greater than 0".to_string());
        }
        if self.temperature < 0.0 {
            return Err("sampling.temperature must not be negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err("sampling.top_p must be within 0.0..=1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_p) {
            return Err("sampling.min_p must be within 0.0..=1.0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SamplingConfig::default();
        assert_eq!(s.max_tokens, 1024);
        assert_eq!(s.top_k, 40);
        assert!(s.stop.contains(&"<|im_end|>".to_string()));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_override_from_json() {
        let s: SamplingConfig = serde_json::from_str(r#"{"temperature": 0.2, "max_tokens": 64}"#).unwrap();
        assert_eq!(s.max_tokens, 64);
        assert!((s.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(s.top_k, 40);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let r: Result<SamplingConfig, _> = serde_json::from_str(r#"{"temprature": 0.2}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_with_extra_stops_dedups() {
        let s = SamplingConfig::default().with_extra_stops(["<|im_end|>", "### Instruction:", ""]);
        assert_eq!(s.stop.iter().filter(|x| x.as_str() == "<|im_end|>").count(), 1);
        assert!(s.stop.contains(&"### Instruction:".to_string()));
        assert!(!s.stop.contains(&String::new()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut s = SamplingConfig::default();
        s.top_p = 1.5;
        assert!(s.validate().is_err());
        let mut s = SamplingConfig::default();
        s.max_tokens = 0;
        assert!(s.validate().is_err());
    }
}
