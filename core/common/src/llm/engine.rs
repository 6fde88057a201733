//! 推論エンジンのトレイト定義
//!
//! モデル読み込み・トークナイズ・サンプリングはすべてエンジン側の責務。
//! アプリはプロンプト文字列と SamplingConfig を渡し、Fragment の列を受け取るだけ。

use crate::error::Error;
use crate::llm::events::LlmEvent;
use crate::llm::sampling::SamplingConfig;

/// 推論エンジン（外部ライブラリ・サーバへの唯一の呼び出し口）
///
/// 単一スレッドで逐次に使う前提のため Send / Sync は要求しない。
pub trait InferenceEngine {
    /// エンジン名（ログ用）
    fn name(&self) -> &str;

    /// プロンプトを渡してストリーミング生成する
    ///
    /// Fragment は到着順にすぐ `callback` へ渡す。最後に `LlmEvent::Completed` を 1 回渡す。
    /// `callback` が返したエラーは加工せずそのまま返すこと（中断の伝播に使う）。
    fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
        callback: &mut dyn FnMut(LlmEvent) -> Result<(), Error>,
    ) -> Result<(), Error>;
}
