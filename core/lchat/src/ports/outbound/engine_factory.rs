//! 推論エンジンを生成する Outbound ポート

use common::error::Error;
use common::llm::{EngineRequest, InferenceEngine};

/// バックエンド種別とモデルパスから推論エンジンを作る（失敗は Error::Load）
pub trait EngineFactory {
    fn create(&self, req: &EngineRequest<'_>) -> Result<Box<dyn InferenceEngine>, Error>;
}
