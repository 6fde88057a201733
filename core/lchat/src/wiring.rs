//! 配線: 標準アダプタで UseCase を組み立てる

use std::sync::Arc;

use common::adapter::{FileJsonLog, NoopLog, StderrLog, StdClock, StdEnvResolver, StdFileSystem};
use common::ports::outbound::{Clock, EnvResolver, FileSystem, Log, LogLevel, LogRecord};

use crate::adapter::{
    CliOperatorPrompt, FsModelLocator, NoopInterruptChecker, SigintChecker, StdEngineFactory,
    StdEventSinkFactory, StdinLineReader,
};
use crate::ports::outbound::{InterruptChecker, LineReader};
use crate::usecase::app::{ChatDeps, ChatUseCase, ConfigDeps, ConsoleDeps, ModelDeps, ObsDeps};

pub struct App {
    pub logger: Arc<dyn Log>,
    pub chat: ChatUseCase,
}

/// ログの出力先: `<home>/state/logs/lchat.jsonl`（ホームが解決できなければ出さない）
fn wire_logger(fs: &Arc<dyn FileSystem>, env_resolver: &dyn EnvResolver, verbose: bool) -> Arc<dyn Log> {
    let file_log: Arc<dyn Log> = match env_resolver.resolve_home_dir() {
        Ok(home) => Arc::new(FileJsonLog::new(Arc::clone(fs), home.log_file())),
        Err(_) => Arc::new(NoopLog),
    };
    if verbose {
        Arc::new(StderrLog::new(file_log))
    } else {
        file_log
    }
}

/// 配線: 標準アダプタで ChatUseCase を組み立てる
pub fn wire_chat(verbose: bool) -> App {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env_resolver: Arc<dyn EnvResolver> = Arc::new(StdEnvResolver);
    let logger = wire_logger(&fs, env_resolver.as_ref(), verbose);
    let clock: Arc<dyn Clock> = Arc::new(StdClock);
    let reader: Arc<dyn LineReader> = Arc::new(StdinLineReader::new());

    let interrupt: Arc<dyn InterruptChecker> = match SigintChecker::new() {
        Ok(checker) => Arc::new(checker),
        Err(e) => {
            let _ = logger.log(
                &LogRecord::new(LogLevel::Warn, "SIGINT handler not installed", "wiring", "lifecycle")
                    .with_field("error", e.to_string()),
            );
            Arc::new(NoopInterruptChecker::new())
        }
    };

    let chat = ChatUseCase::new(ChatDeps {
        config: ConfigDeps {
            fs: Arc::clone(&fs),
            env_resolver,
        },
        model: ModelDeps {
            locator: Arc::new(FsModelLocator::new(Arc::clone(&fs))),
            operator: Arc::new(CliOperatorPrompt::new(Arc::clone(&reader))),
            engines: Arc::new(StdEngineFactory),
        },
        console: ConsoleDeps {
            reader,
            sink_factory: Arc::new(StdEventSinkFactory::new(Arc::clone(&clock))),
            interrupt,
        },
        obs: ObsDeps {
            clock,
            log: Arc::clone(&logger),
        },
    });
    App { logger, chat }
}
