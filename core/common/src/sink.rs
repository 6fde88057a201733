//! ストリーミングの「消費」側（表示・計測）を分離する EventSink
//!
//! セッションは ChatEvent を Sink 列に流すだけで、画面への出し方は Sink が決める。

use crate::error::Error;
use crate::llm::events::LlmEvent;

/// セッションから Sink へ流すイベント
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// 空入力のため履歴を変えずに入力待ちへ戻った
    InputSkipped,
    /// アシスタントのターン開始（推論呼び出しの直前）
    TurnStarted,
    /// 推論ストリーム由来
    Llm(LlmEvent),
    /// 生成に失敗した
    TurnFailed { message: String },
}

/// イベントを受け取る Sink
pub trait EventSink {
    /// 1 イベントを処理する
    fn on_event(&mut self, ev: &ChatEvent) -> Result<(), Error>;
    /// ターン終了時（成功・失敗とも）
    fn on_end(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
