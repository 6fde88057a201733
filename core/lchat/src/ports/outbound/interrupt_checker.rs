//! Ctrl+C（SIGINT）による割り込みを検知する Outbound ポート
//!
//! 生成中に中断されたら、それまでの出力を残してターンを終える。

/// 割り込みが要求されたかどうかを返す能力
pub trait InterruptChecker: Send + Sync {
    fn is_interrupted(&self) -> bool;

    /// 生成の開始（true）・終了（false）を知らせる。どちらでもフラグは下ろす
    fn set_generating(&self, generating: bool);
}
