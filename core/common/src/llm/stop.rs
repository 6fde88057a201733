//! 停止シーケンス検出（トークン単位で流れてくるテキスト用）
//!
//! 停止シーケンスの途中かもしれない末尾は表示せずに保留し、確定した部分だけを返す。

/// ストリーム上の停止シーケンス検出器
#[derive(Debug, Clone)]
pub struct StopMatcher {
    stops: Vec<String>,
    pending: String,
    stopped: bool,
}

/// push の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopScan {
    /// すぐに表示してよいテキスト
    pub emit: String,
    /// 停止シーケンスに到達した
    pub stopped: bool,
}

impl StopMatcher {
    pub fn new(stops: &[String]) -> Self {
        Self {
            stops: stops.iter().filter(|s| !s.is_empty()).cloned().collect(),
            pending: String::new(),
            stopped: false,
        }
    }

    pub fn push(&mut self, chunk: &str) -> StopScan {
        if self.stopped {
            return StopScan {
                emit: String::new(),
                stopped: true,
            };
        }
        self.pending.push_str(chunk);

        let earliest = self
            .stops
            .iter()
            .filter_map(|s| self.pending.find(s.as_str()))
            .min();
        if let Some(idx) = earliest {
            let emit = self.pending[..idx].to_string();
            self.pending.clear();
            self.stopped = true;
            return StopScan {
                emit,
                stopped: true,
            };
        }

        let keep = self.partial_suffix_len();
        let split = self.pending.len() - keep;
        let emit = self.pending[..split].to_string();
        self.pending.drain(..split);
        StopScan {
            emit,
            stopped: false,
        }
    }

    /// ストリーム終了時に保留分を吐き出す
    pub fn flush(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    /// pending の末尾のうち、いずれかの停止シーケンスの先頭と一致する最長の長さ（バイト）
    fn partial_suffix_len(&self) -> usize {
        let mut best = 0;
        for stop in &self.stops {
            let max = stop.len().saturating_sub(1).min(self.pending.len());
            for len in (1..=max).rev() {
                let start = self.pending.len() - len;
                if !self.pending.is_char_boundary(start) || !stop.is_char_boundary(len) {
                    continue;
                }
                if stop.starts_with(&self.pending[start..]) {
                    best = best.max(len);
                    break;
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(stops: &[&str]) -> StopMatcher {
        let stops: Vec<String> = stops.iter().map(|s| s.to_string()).collect();
        StopMatcher::new(&stops)
    }

    #[test]
    fn test_plain_text_passes_through() {
        let mut m = matcher(&["</s>"]);
        let r = m.push("Hello");
        assert_eq!(r.emit, "Hello");
        assert!(!r.stopped);
    }

    #[test]
    fn test_stop_inside_chunk() {
        let mut m = matcher(&["<|im_end|>"]);
        let r = m.push("Done.<|im_end|>trailing");
        assert_eq!(r.emit, "Done.");
        assert!(r.stopped);
        assert_eq!(m.push("more").emit, "");
    }

    #[test]
    fn test_stop_split_across_chunks_is_held_back() {
        let mut m = matcher(&["[/INST]"]);
        let r1 = m.push("ok [/");
        assert_eq!(r1.emit, "ok ");
        let r2 = m.push("INST] ignored");
        assert_eq!(r2.emit, "");
        assert!(r2.stopped);
    }

    #[test]
    fn test_false_alarm_prefix_is_released() {
        let mut m = matcher(&["</s>"]);
        assert_eq!(m.push("a <").emit, "a ");
        assert_eq!(m.push("b").emit, "<b");
    }

    #[test]
    fn test_flush_returns_pending() {
        let mut m = matcher(&["</s>"]);
        assert_eq!(m.push("x</").emit, "x");
        assert_eq!(m.flush(), "</");
        assert_eq!(m.flush(), "");
    }

    #[test]
    fn test_multibyte_text_does_not_split_chars() {
        let mut m = matcher(&["。終"]);
        let r = m.push("こんにちは。");
        assert_eq!(r.emit, "こんにちは");
        let r = m.push("元気");
        assert_eq!(r.emit, "。元気");
    }

    #[test]
    fn test_no_stops_emits_everything() {
        let mut m = StopMatcher::new(&[]);
        assert_eq!(m.push("abc").emit, "abc");
    }
}
