//! 推論エンジンとストリームの共通部品
//!
//! エンジン（llama.cpp プロセス内 / llama.cpp server / echo）の差はここで吸収し、
//! アプリ側には InferenceEngine と LlmEvent だけを見せる。

pub mod echo;
pub mod engine;
pub mod events;
pub mod factory;
pub mod llama_server;
pub mod load_params;
pub mod sampling;
pub mod stop;
pub mod token_text;

#[cfg(feature = "llama-cpp")]
pub mod llama_cpp;

pub use engine::InferenceEngine;
pub use events::{FinishReason, Fragment, LlmEvent};
pub use factory::{create_engine, BackendKind, EngineRequest};
pub use load_params::LoadParams;
pub use sampling::SamplingConfig;
