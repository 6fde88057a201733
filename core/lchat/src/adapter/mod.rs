//! lchat 固有の Outbound ポート実装

mod cli_operator_prompt;
mod fs_model_locator;
mod sigint_checker;
mod sinks;
mod std_engine_factory;
mod stdin_line_reader;
mod stub_engine;

pub use cli_operator_prompt::CliOperatorPrompt;
pub use fs_model_locator::FsModelLocator;
pub use sigint_checker::{NoopInterruptChecker, SigintChecker};
pub use sinks::StdEventSinkFactory;
pub use std_engine_factory::StdEngineFactory;
pub use stdin_line_reader::StdinLineReader;
#[cfg(test)]
pub use stub_engine::{ScriptedLineReader, StubCalls, StubEngine, StubEngineFactory, StubTurn};
