//! Ctrl+C（SIGINT）で割り込みフラグを立てる InterruptChecker 実装
//!
//! 生成中ならフラグを立てるだけ。入力待ちのときはその場で終了コード 130 で終わる。

use crate::ports::outbound::InterruptChecker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Flags {
    generating: AtomicBool,
    interrupted: AtomicBool,
}

/// Ctrl+C を受けたらフラグを立てる実装
pub struct SigintChecker {
    flags: Arc<Flags>,
}

impl SigintChecker {
    /// 新しいチェッカーを作成し、SIGINT ハンドラを登録する。
    /// ハンドラは初回のみ登録できる（ctrlc の仕様）。
    pub fn new() -> Result<Self, ctrlc::Error> {
        let flags = Arc::new(Flags::default());
        let handler_flags = Arc::clone(&flags);
        ctrlc::set_handler(move || {
            if handler_flags.generating.load(Ordering::SeqCst) {
                handler_flags.interrupted.store(true, Ordering::SeqCst);
            } else {
                eprintln!();
                std::process::exit(130);
            }
        })?;
        Ok(Self { flags })
    }
}

impl InterruptChecker for SigintChecker {
    fn is_interrupted(&self) -> bool {
        self.flags.interrupted.load(Ordering::SeqCst)
    }

    fn set_generating(&self, generating: bool) {
        self.flags.interrupted.store(false, Ordering::SeqCst);
        self.flags.generating.store(generating, Ordering::SeqCst);
    }
}

/// 割り込みを検知しないスタブ（ハンドラ登録に失敗した場合などに使用）
pub struct NoopInterruptChecker;

impl NoopInterruptChecker {
    pub fn new() -> Self {
        Self
    }
}

impl InterruptChecker for NoopInterruptChecker {
    fn is_interrupted(&self) -> bool {
        false
    }

    fn set_generating(&self, _generating: bool) {}
}
