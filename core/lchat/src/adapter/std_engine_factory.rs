//! common::llm::create_engine へ委譲する EngineFactory 実装

use crate::ports::outbound::EngineFactory;
use common::error::Error;
use common::llm::{create_engine, EngineRequest, InferenceEngine};

pub struct StdEngineFactory;

impl EngineFactory for StdEngineFactory {
    fn create(&self, req: &EngineRequest<'_>) -> Result<Box<dyn InferenceEngine>, Error> {
        create_engine(req)
    }
}
