//! 1 行入力の Outbound ポート

use common::error::Error;

/// プロンプトを表示して 1 行読む
pub trait LineReader {
    /// 改行を含まない 1 行。入力の終端（EOF）なら None
    fn read_line(&self, prompt: &str) -> Result<Option<String>, Error>;
}
