//! Outbound ポート: lchat 固有の外界アクセス

mod engine_factory;
mod event_sink_factory;
mod interrupt_checker;
mod line_reader;
mod model_locator;
mod operator_prompt;

pub use engine_factory::EngineFactory;
pub use event_sink_factory::EventSinkFactory;
pub use interrupt_checker::InterruptChecker;
pub use line_reader::LineReader;
pub use model_locator::ModelLocator;
pub use operator_prompt::OperatorPrompt;
