//! モデル読み込みパラメータ（プロセス内エンジン用）

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadParams {
    /// コンテキスト長（トークン数）
    pub n_ctx: u32,
    /// GPU に載せる層数。負数は全層
    pub n_gpu_layers: i32,
    /// 推論スレッド数。未指定なら CPU 数
    pub n_threads: Option<i32>,
    pub n_batch: u32,
    /// スワップ防止のためモデルをメモリにロックする
    pub use_mlock: bool,
}

impl Default for LoadParams {
    fn default() -> Self {
        Self {
            n_ctx: 32768,
            n_gpu_layers: -1,
            n_threads: None,
            n_batch: 512,
            use_mlock: true,
        }
    }
}

impl LoadParams {
    /// 実際に使うスレッド数
    pub fn effective_threads(&self) -> i32 {
        self.n_threads.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get() as i32)
                .unwrap_or(1)
        })
    }

    /// 負数を「全層」として u32 に寄せる
    pub fn gpu_layers(&self) -> u32 {
        if self.n_gpu_layers < 0 {
            u32::MAX
        } else {
            self.n_gpu_layers as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = LoadParams::default();
        assert_eq!(p.n_ctx, 32768);
        assert_eq!(p.n_batch, 512);
        assert_eq!(p.gpu_layers(), u32::MAX);
        assert!(p.effective_threads() >= 1);
    }

    #[test]
    fn test_explicit_threads_and_layers() {
        let p: LoadParams = serde_json::from_str(r#"{"n_threads": 3, "n_gpu_layers": 0}"#).unwrap();
        assert_eq!(p.effective_threads(), 3);
        assert_eq!(p.gpu_layers(), 0);
    }
}
