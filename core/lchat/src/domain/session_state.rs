//! セッションループの状態

use crate::domain::history::Checkpoint;

/// AwaitingInput → Generating → Idle → AwaitingInput、終了は Closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    /// 整形済みプロンプトと、失敗時に戻す履歴位置
    Generating { prompt: String, checkpoint: Checkpoint },
    /// 応答を履歴に追加して切り詰めた直後
    Idle,
    Closed,
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionState::Closed)
    }
}
