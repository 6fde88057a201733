//! 会話履歴（History）のドメイン型
//!
//! 先頭は必ず system メッセージ 1 件。追加と切り詰め以外では変更しない。

use common::msg::Message;

/// 切り詰め前の長さ。rollback で使う
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// 会話履歴（上限付き）
#[derive(Debug, Clone)]
pub struct History {
    messages: Vec<Message>,
    cap: usize,
}

impl History {
    /// system メッセージ 1 件から始める
    pub fn with_system(system_prompt: impl Into<String>, cap: usize) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            cap,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.messages.len())
    }

    /// checkpoint 以降に追加したメッセージを捨てる
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.messages.truncate(checkpoint.0.max(1));
    }

    /// 上限を超えていれば切り詰める。切り詰めたら true
    pub fn enforce_cap(&mut self) -> bool {
        if self.messages.len() <= self.cap {
            return false;
        }
        self.messages = truncate(&self.messages, self.cap);
        true
    }
}

/// 末尾に残す件数（先頭の 1 件と、次の追加分の 1 件を空けておく）
fn tail_len(cap: usize) -> usize {
    cap.saturating_sub(2)
}

/// 上限を超えた履歴を「先頭 + 直近の往復」に切り詰める（純関数）
///
/// cap 以下ならそのまま返す。cap = 10 なら 11 件が 1 + 8 = 9 件になる。
pub fn truncate(messages: &[Message], cap: usize) -> Vec<Message> {
    if messages.len() <= cap || messages.is_empty() {
        return messages.to_vec();
    }
    let keep = tail_len(cap).min(messages.len() - 1);
    let mut out = Vec::with_capacity(keep + 1);
    out.push(messages[0].clone());
    out.extend_from_slice(&messages[messages.len() - keep..]);
    out
}
