//! テスト用: 台本どおりに fragment を返す推論エンジンと入力


#[cfg(test)]
pub use stub::{ScriptedLineReader, StubCalls, StubEngine, StubEngineFactory, StubTurn};
