//! 対話コマンドのユースケース: 設定の解決 → モデル探索 → エンジン生成 → セッション実行

use crate::domain::{detect_template, ChatOptions, ExitKeywords, History, TemplateKind};
use crate::ports::outbound::{
    EngineFactory, EventSinkFactory, InterruptChecker, LineReader, ModelLocator, OperatorPrompt,
};
use crate::usecase::locate_model::locate_model;
use crate::usecase::session::{ChatSession, SessionDeps, SessionSettings};
use common::config::ChatConfig;
use common::error::Error;
use common::llm::EngineRequest;
use common::ports::outbound::{Clock, EnvResolver, FileSystem, Log, LogLevel, LogRecord};
use std::sync::Arc;

// --- 責務別 Deps（usecase が定義を所有し、wiring は組み立てるだけ）

pub struct ConfigDeps {
    pub fs: Arc<dyn FileSystem>,
    pub env_resolver: Arc<dyn EnvResolver>,
}

pub struct ModelDeps {
    pub locator: Arc<dyn ModelLocator>,
    pub operator: Arc<dyn OperatorPrompt>,
    pub engines: Arc<dyn EngineFactory>,
}

pub struct ConsoleDeps {
    pub reader: Arc<dyn LineReader>,
    pub sink_factory: Arc<dyn EventSinkFactory>,
    pub interrupt: Arc<dyn InterruptChecker>,
}

pub struct ObsDeps {
    pub clock: Arc<dyn Clock>,
    pub log: Arc<dyn Log>,
}

pub struct ChatDeps {
    pub config: ConfigDeps,
    pub model: ModelDeps,
    pub console: ConsoleDeps,
    pub obs: ObsDeps,
}

pub struct ChatUseCase {
    deps: ChatDeps,
}

/// CLI の上書き値を設定に重ねる（CLI が最優先）
pub fn apply_options(mut config: ChatConfig, opts: &ChatOptions) -> ChatConfig {
    if let Some(dir) = &opts.model_dir {
        config.model_dir = dir.clone();
    }
    if let Some(backend) = opts.backend {
        config.backend = Some(backend);
    }
    if let Some(url) = &opts.server_url {
        config.server_url = url.clone();
    }
    if let Some(template) = &opts.template {
        config.template = Some(template.clone());
    }
    if let Some(system) = &opts.system {
        config.system_prompt = system.clone();
    }
    if let Some(cap) = opts.history_cap {
        config.history_cap = cap;
    }
    if let Some(policy) = opts.on_error {
        config.on_generation_error = policy;
    }
    if opts.stats {
        config.show_stats = true;
    }
    config
}

impl ChatUseCase {
    pub fn new(deps: ChatDeps) -> Self {
        Self { deps }
    }

    fn log(&self, record: LogRecord) {
        let _ = self.deps.obs.log.log(&record);
    }

    /// `<home>/config.json` を読む。ファイルが無ければデフォルト
    pub fn load_config(&self) -> Result<ChatConfig, Error> {
        let home = match self.deps.config.env_resolver.resolve_home_dir() {
            Ok(home) => home,
            Err(e) => {
                self.log(
                    LogRecord::new(LogLevel::Warn, "home not resolved, using defaults", "usecase", "config")
                        .with_field("error", e.to_string()),
                );
                return Ok(ChatConfig::default());
            }
        };
        let path = home.config_file();
        if !self.deps.config.fs.exists(&path) {
            return Ok(ChatConfig::default());
        }
        let text = self.deps.config.fs.read_to_string(&path)?;
        let config = ChatConfig::parse(&text).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        self.log(
            LogRecord::new(LogLevel::Info, "config loaded", "usecase", "config")
                .with_field("path", path.display().to_string()),
        );
        Ok(config)
    }

    pub fn run(&self, opts: &ChatOptions) -> Result<i32, Error> {
        let config = apply_options(self.load_config()?, opts);
        config.validate()?;
        // 名前の誤りはモデル探索より前に弾く
        let template_override = config
            .template
            .as_deref()
            .map(str::parse::<TemplateKind>)
            .transpose()?;

        let model = locate_model(
            self.deps.model.locator.as_ref(),
            self.deps.model.operator.as_ref(),
            self.deps.obs.log.as_ref(),
            &config.model_dir,
            &config.model_extension,
        )?;

        let (template, source) = match template_override {
            Some(kind) => (kind, "override"),
            None => (detect_template(&model.file_name()), "detected"),
        };
        self.log(
            LogRecord::new(LogLevel::Info, "template selected", "usecase", "model")
                .with_field("template", template.as_str())
                .with_field("source", source),
        );

        let backend = config.backend();
        let engine = self.deps.model.engines.create(&EngineRequest {
            backend,
            model_path: model.as_path(),
            load: &config.load,
            server_url: &config.server_url,
        })?;
        self.log(
            LogRecord::new(LogLevel::Info, "model loaded", "usecase", "model")
                .with_field("backend", backend.as_str())
                .with_field("path", model.display().to_string()),
        );

        let settings = SessionSettings {
            template,
            sampling: config.sampling.clone(),
            exit_keywords: ExitKeywords::new(&config.exit_keywords),
            on_error: config.on_generation_error,
            show_stats: config.show_stats,
        };
        let deps = SessionDeps {
            reader: Arc::clone(&self.deps.console.reader),
            sink_factory: Arc::clone(&self.deps.console.sink_factory),
            interrupt: Arc::clone(&self.deps.console.interrupt),
            clock: Arc::clone(&self.deps.obs.clock),
            log: Arc::clone(&self.deps.obs.log),
        };
        let history = History::with_system(config.system_prompt.clone(), config.history_cap);
        let mut session = ChatSession::new(engine, deps, settings, history);
        session.run()?;
        Ok(0)
    }
}
