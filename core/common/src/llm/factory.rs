//! 推論エンジンのファクトリー

use crate::error::Error;
use crate::llm::echo::EchoEngine;
use crate::llm::engine::InferenceEngine;
use crate::llm::llama_server::LlamaServerEngine;
use crate::llm::load_params::LoadParams;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 推論エンジンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// プロセス内 llama.cpp（feature `llama-cpp`）
    #[serde(alias = "llama-cpp", alias = "llama")]
    LlamaCpp,
    /// 起動済みの llama.cpp server
    Server,
    /// モデルを呼ばないデバッグ用
    Echo,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::LlamaCpp, BackendKind::Server, BackendKind::Echo];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::LlamaCpp => "llama_cpp",
            BackendKind::Server => "server",
            BackendKind::Echo => "echo",
        }
    }

    /// ビルド構成に応じたデフォルト
    pub fn default_for_build() -> Self {
        if cfg!(feature = "llama-cpp") {
            BackendKind::LlamaCpp
        } else {
            BackendKind::Server
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "llama_cpp" | "llama-cpp" | "llama" => Ok(BackendKind::LlamaCpp),
            "server" => Ok(BackendKind::Server),
            "echo" => Ok(BackendKind::Echo),
            _ => Err(Error::invalid_argument(format!(
                "Unknown backend: {}. Supported backends: llama_cpp, server, echo",
                s
            ))),
        }
    }
}

/// エンジン生成に必要な情報
#[derive(Debug, Clone)]
pub struct EngineRequest<'a> {
    pub backend: BackendKind,
    pub model_path: &'a Path,
    pub load: &'a LoadParams,
    pub server_url: &'a str,
}

/// エンジンを作成する。失敗はすべて Error::Load（起動時の致命的エラー）
pub fn create_engine(req: &EngineRequest<'_>) -> Result<Box<dyn InferenceEngine>, Error> {
    match req.backend {
        BackendKind::Echo => Ok(Box::new(EchoEngine::new())),
        BackendKind::Server => Ok(Box::new(LlamaServerEngine::connect(req.server_url)?)),
        BackendKind::LlamaCpp => create_llama_cpp(req),
    }
}

#[cfg(feature = "llama-cpp")]
fn create_llama_cpp(req: &EngineRequest<'_>) -> Result<Box<dyn InferenceEngine>, Error> {
    let engine = crate::llm::llama_cpp::LlamaCppEngine::load(req.model_path, req.load)?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "llama-cpp"))]
fn create_llama_cpp(_req: &EngineRequest<'_>) -> Result<Box<dyn InferenceEngine>, Error> {
    Err(Error::load(
        "this build does not include the llama_cpp backend (rebuild with `--features llama-cpp`, or use --backend server)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("server".parse::<BackendKind>().unwrap(), BackendKind::Server);
        assert_eq!("ECHO".parse::<BackendKind>().unwrap(), BackendKind::Echo);
        assert_eq!("llama-cpp".parse::<BackendKind>().unwrap(), BackendKind::LlamaCpp);
        let err = "gpt".parse::<BackendKind>().unwrap_err();
        assert!(err.to_string().contains("Unknown backend"));
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_backend_as_str_roundtrip() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.as_str().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_backend_deserialize() {
        let k: BackendKind = serde_json::from_str("\"llama_cpp\"").unwrap();
        assert_eq!(k, BackendKind::LlamaCpp);
        let k: BackendKind = serde_json::from_str("\"echo\"").unwrap();
        assert_eq!(k, BackendKind::Echo);
    }

    #[test]
    fn test_create_echo_engine() {
        let load = LoadParams::default();
        let engine = create_engine(&EngineRequest {
            backend: BackendKind::Echo,
            model_path: Path::new("gguf/model.gguf"),
            load: &load,
            server_url: "",
        })
        .unwrap();
        assert_eq!(engine.name(), "echo");
    }

    #[cfg(not(feature = "llama-cpp"))]
    #[test]
    fn test_llama_cpp_without_feature_is_load_error() {
        let load = LoadParams::default();
        let result = create_engine(&EngineRequest {
            backend: BackendKind::LlamaCpp,
            model_path: Path::new("gguf/model.gguf"),
            load: &load,
            server_url: "",
        });
        assert!(matches!(result, Err(Error::Load(_))));
    }
}
