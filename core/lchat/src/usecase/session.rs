//! 対話セッション（状態機械）
//!
//! AwaitingInput → Generating → Idle → AwaitingInput を 1 ステップずつ進める。
//! 履歴はこの型だけが所有し、追加と切り詰め以外では変更しない。

use crate::domain::history::Checkpoint;
use crate::domain::{classify_input, format_prompt, ExitKeywords, History, SessionState, TemplateKind, UserInput};
use crate::ports::outbound::{EventSinkFactory, InterruptChecker, LineReader};
use common::config::GenerationErrorPolicy;
use common::error::Error;
use common::llm::{FinishReason, InferenceEngine, LlmEvent, SamplingConfig};
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord};
use common::sink::{ChatEvent, EventSink};
use std::sync::Arc;

/// 入力待ちで表示するプロンプト
pub const INPUT_PROMPT: &str = "Input: ";

/// セッション中は固定の設定
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub template: TemplateKind,
    pub sampling: SamplingConfig,
    pub exit_keywords: ExitKeywords,
    pub on_error: GenerationErrorPolicy,
    pub show_stats: bool,
}

pub struct SessionDeps {
    pub reader: Arc<dyn LineReader>,
    pub sink_factory: Arc<dyn EventSinkFactory>,
    pub interrupt: Arc<dyn InterruptChecker>,
    pub clock: Arc<dyn Clock>,
    pub log: Arc<dyn Log>,
}

/// 1 ターン分の生成結果
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// 受け取った fragment をそのまま連結したもの（trim 前）
    pub text: String,
    pub fragments: usize,
    pub finish: FinishReason,
    pub elapsed_ms: u64,
}

pub struct ChatSession {
    engine: Box<dyn InferenceEngine>,
    deps: SessionDeps,
    settings: SessionSettings,
    history: History,
    state: SessionState,
    turns: usize,
}

fn emit(sinks: &mut [Box<dyn EventSink>], ev: &ChatEvent) -> Result<(), Error> {
    for sink in sinks.iter_mut() {
        sink.on_event(ev)?;
    }
    Ok(())
}

impl ChatSession {
    /// テンプレートの停止シーケンスはここで一度だけサンプリング設定に足す
    pub fn new(
        engine: Box<dyn InferenceEngine>,
        deps: SessionDeps,
        mut settings: SessionSettings,
        history: History,
    ) -> Self {
        settings.sampling = settings
            .sampling
            .clone()
            .with_extra_stops(settings.template.stop_sequences().iter().copied());
        Self {
            engine,
            deps,
            settings,
            history,
            state: SessionState::AwaitingInput,
            turns: 0,
        }
    }

    #[allow(dead_code)] // テストで使用
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[allow(dead_code)] // テストで使用
    pub fn history(&self) -> &History {
        &self.history
    }

    #[allow(dead_code)] // テストで使用
    pub fn sampling(&self) -> &SamplingConfig {
        &self.settings.sampling
    }

    /// 完了したターン数
    #[allow(dead_code)] // テストで使用
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Closed になるまでステップを進める。Abort 方針の生成失敗だけが Err で返る
    pub fn run(&mut self) -> Result<(), Error> {
        let _ = self.deps.log.log(
            &LogRecord::new(LogLevel::Info, "session started", "usecase", "lifecycle")
                .with_field("engine", self.engine.name())
                .with_field("template", self.settings.template.as_str())
                .with_field("history_cap", self.history.cap()),
        );
        while !self.state.is_closed() {
            self.step()?;
        }
        let _ = self.deps.log.log(
            &LogRecord::new(LogLevel::Info, "session closed", "usecase", "lifecycle")
                .with_field("turns", self.turns),
        );
        Ok(())
    }

    /// 状態を 1 つ進める
    pub fn step(&mut self) -> Result<(), Error> {
        let current = std::mem::replace(&mut self.state, SessionState::Closed);
        self.state = match current {
            SessionState::AwaitingInput => self.await_input()?,
            SessionState::Generating { prompt, checkpoint } => self.generate(&prompt, checkpoint)?,
            SessionState::Idle => SessionState::AwaitingInput,
            SessionState::Closed => SessionState::Closed,
        };
        Ok(())
    }

    fn await_input(&mut self) -> Result<SessionState, Error> {
        let line = match self.deps.reader.read_line(INPUT_PROMPT)? {
            Some(line) => line,
            // 入力の終端は終了キーワードと同じ扱い
            None => return Ok(SessionState::Closed),
        };
        match classify_input(&line, &self.settings.exit_keywords) {
            UserInput::Blank => {
                let mut sinks = self.deps.sink_factory.create_sinks(false);
                emit(&mut sinks, &ChatEvent::InputSkipped)?;
                Ok(SessionState::AwaitingInput)
            }
            UserInput::Exit => Ok(SessionState::Closed),
            UserInput::Message(text) => {
                let checkpoint = self.history.checkpoint();
                self.history.push_user(text);
                let prompt = format_prompt(self.settings.template, self.history.messages());
                Ok(SessionState::Generating { prompt, checkpoint })
            }
        }
    }

    fn generate(&mut self, prompt: &str, checkpoint: Checkpoint) -> Result<SessionState, Error> {
        match self.run_turn(prompt) {
            Ok(outcome) => {
                let text = outcome.text.trim();
                if text.is_empty() && outcome.finish == FinishReason::Interrupted {
                    // 何も出ないうちに中断されたら、このターンは無かったことにする
                    self.history.rollback(checkpoint);
                    let _ = self.deps.log.log(&LogRecord::new(
                        LogLevel::Info,
                        "turn interrupted before output",
                        "usecase",
                        "turn",
                    ));
                    return Ok(SessionState::AwaitingInput);
                }
                self.history.push_assistant(text);
                let trimmed = self.history.enforce_cap();
                self.turns += 1;
                let _ = self.deps.log.log(
                    &LogRecord::new(LogLevel::Info, "turn completed", "usecase", "turn")
                        .with_field("fragments", outcome.fragments)
                        .with_field("elapsed_ms", outcome.elapsed_ms)
                        .with_field("finish", outcome.finish.as_str())
                        .with_field("history_len", self.history.len())
                        .with_field("history_trimmed", trimmed),
                );
                Ok(SessionState::Idle)
            }
            Err(e) => {
                self.history.rollback(checkpoint);
                let policy = self.settings.on_error;
                let _ = self.deps.log.log(
                    &LogRecord::new(LogLevel::Error, "generation failed", "usecase", "turn")
                        .with_field("error", e.to_string())
                        .with_field("policy", policy.as_str()),
                );
                match policy {
                    GenerationErrorPolicy::Resume => Ok(SessionState::AwaitingInput),
                    GenerationErrorPolicy::Abort => Err(e),
                }
            }
        }
    }

    /// 推論を呼び、届いた順に Sink へ流しながら連結する
    fn run_turn(&self, prompt: &str) -> Result<TurnOutcome, Error> {
        let mut sinks = self.deps.sink_factory.create_sinks(self.settings.show_stats);
        emit(&mut sinks, &ChatEvent::TurnStarted)?;

        let interrupt = Arc::clone(&self.deps.interrupt);
        let started = self.deps.clock.now_ms();
        let mut text = String::new();
        let mut fragments = 0usize;
        let mut finish = FinishReason::Stop;

        interrupt.set_generating(true);
        let result = {
            let mut on_event = |ev: LlmEvent| -> Result<(), Error> {
                if interrupt.is_interrupted() {
                    return Err(Error::Interrupted);
                }
                match &ev {
                    LlmEvent::Fragment(f) => {
                        fragments += 1;
                        text.push_str(f.text());
                    }
                    LlmEvent::Completed { finish: f } => finish = f.clone(),
                }
                emit(&mut sinks, &ChatEvent::Llm(ev))
            };
            self.engine
                .generate(prompt, &self.settings.sampling, &mut on_event)
        };
        interrupt.set_generating(false);
        let elapsed_ms = self.deps.clock.now_ms().saturating_sub(started);

        match result {
            Ok(()) => {}
            Err(Error::Interrupted) => {
                finish = FinishReason::Interrupted;
                emit(
                    &mut sinks,
                    &ChatEvent::Llm(LlmEvent::Completed {
                        finish: FinishReason::Interrupted,
                    }),
                )?;
            }
            Err(e) => {
                let failed = ChatEvent::TurnFailed {
                    message: e.to_string(),
                };
                for sink in sinks.iter_mut() {
                    let _ = sink.on_event(&failed);
                    let _ = sink.on_end();
                }
                return Err(e);
            }
        }
        for sink in sinks.iter_mut() {
            sink.on_end()?;
        }
        Ok(TurnOutcome {
            text,
            fragments,
            finish,
            elapsed_ms,
        })
    }
}
