//! llama.cpp をプロセス内で使う推論エンジン（feature `llama-cpp`）
//!
//! GGUF の読み込み・トークナイズ・サンプリングは llama-cpp-2 に任せ、
//! ここではトークンを文字列に戻して Fragment として流すだけ。

use crate::error::Error;
use crate::llm::engine::InferenceEngine;
use crate::llm::events::{FinishReason, LlmEvent};
use crate::llm::load_params::LoadParams;
use crate::llm::sampling::SamplingConfig;
use crate::llm::stop::StopMatcher;
use crate::llm::token_text::TokenDecoder;
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// 直近何トークンを繰り返しペナルティの対象にするか
const PENALTY_LAST_N: i32 = 64;

/// llama.cpp エンジン（モデルはプロセス終了まで保持する）
pub struct LlamaCppEngine {
    backend: LlamaBackend,
    model: LlamaModel,
    params: LoadParams,
}

impl LlamaCppEngine {
    pub fn load(model_path: &Path, params: &LoadParams) -> Result<Self, Error> {
        let backend = LlamaBackend::init()
            .map_err(|e| Error::load(format!("Could not initialize llama.cpp backend: {}", e)))?;
        let model_params = LlamaModelParams::default()
            .with_n_gpu_layers(params.gpu_layers())
            .with_use_mlock(params.use_mlock);
        let model = LlamaModel::load_from_file(&backend, model_path, &model_params).map_err(|e| {
            Error::load(format!("Unable to load '{}': {}", model_path.display(), e))
        })?;
        Ok(Self {
            backend,
            model,
            params: params.clone(),
        })
    }

    fn sampler(sampling: &SamplingConfig) -> LlamaSampler {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u32)
            .unwrap_or(1234);
        LlamaSampler::chain_simple([
            LlamaSampler::penalties(
                PENALTY_LAST_N,
                sampling.repeat_penalty,
                sampling.frequency_penalty,
                sampling.presence_penalty,
            ),
            LlamaSampler::top_k(sampling.top_k),
            LlamaSampler::top_p(sampling.top_p, 1),
            LlamaSampler::min_p(sampling.min_p, 1),
            LlamaSampler::temp(sampling.temperature),
            LlamaSampler::dist(seed),
        ])
    }
}

impl InferenceEngine for LlamaCppEngine {
    fn name(&self) -> &str {
        "llama_cpp"
    }

    fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
        callback: &mut dyn FnMut(LlmEvent) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let threads = self.params.effective_threads();
        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(self.params.n_ctx))
            .with_n_batch(self.params.n_batch)
            .with_n_threads(threads)
            .with_n_threads_batch(threads);
        let mut ctx = self
            .model
            .new_context(&self.backend, ctx_params)
            .map_err(|e| Error::generation(format!("Unable to create llama context: {}", e)))?;

        let tokens = self
            .model
            .str_to_token(prompt, AddBos::Always)
            .map_err(|e| Error::generation(format!("Failed to tokenize prompt: {}", e)))?;
        let n_ctx = ctx.n_ctx() as usize;
        if tokens.len() >= n_ctx {
            return Err(Error::generation(format!(
                "Prompt has {} tokens but the context holds {}",
                tokens.len(),
                n_ctx
            )));
        }

        // プロンプトは n_batch ずつ流し込み、最後のトークンだけ logits を取る
        let n_batch = (self.params.n_batch as usize).max(1);
        let mut batch = LlamaBatch::new(n_batch.max(1), 1);
        let last_index = tokens.len() - 1;
        for (chunk_no, chunk) in tokens.chunks(n_batch).enumerate() {
            batch.clear();
            for (offset, token) in chunk.iter().enumerate() {
                let pos = chunk_no * n_batch + offset;
                batch
                    .add(*token, pos as i32, &[0], pos == last_index)
                    .map_err(|e| Error::generation(format!("Failed to build batch: {}", e)))?;
            }
            ctx.decode(&mut batch)
                .map_err(|e| Error::generation(format!("llama_decode() failed: {}", e)))?;
        }

        let mut sampler = Self::sampler(sampling);
        let mut stops = StopMatcher::new(&sampling.stop);
        let mut decoder = TokenDecoder::new();
        let mut n_cur = tokens.len() as i32;
        let mut finish = FinishReason::Length;

        for _ in 0..sampling.max_tokens {
            if n_cur as usize >= n_ctx {
                break;
            }
            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            sampler.accept(token);
            if self.model.is_eog_token(token) {
                finish = FinishReason::Stop;
                break;
            }

            let bytes = self
                .model
                .token_to_bytes(token, Special::Tokenize)
                .map_err(|e| Error::generation(format!("Failed to detokenize: {}", e)))?;
            let piece = decoder.push(&bytes);

            let scan = stops.push(&piece);
            if !scan.emit.is_empty() {
                callback(LlmEvent::text(scan.emit))?;
            }
            if scan.stopped {
                finish = FinishReason::Stop;
                break;
            }

            batch.clear();
            batch
                .add(token, n_cur, &[0], true)
                .map_err(|e| Error::generation(format!("Failed to build batch: {}", e)))?;
            n_cur += 1;
            ctx.decode(&mut batch)
                .map_err(|e| Error::generation(format!("Failed to eval: {}", e)))?;
        }

        // 停止シーケンスで止まった場合は flush が空を返す
        let mut rest = stops.flush();
        if finish != FinishReason::Stop {
            rest.push_str(&decoder.finish());
        }
        if !rest.is_empty() {
            callback(LlmEvent::text(rest))?;
        }
        callback(LlmEvent::Completed { finish })
    }
}
