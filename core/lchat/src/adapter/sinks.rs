//! ストリーミングの「消費」実装（表示と計測の分離）
//!
//! StdoutSink: fragment をそのまま標準出力へ。ターンの前に空行、後に空行 2 つ
//! StatsSink: fragment 数と経過時間を数え、ターン終了時に 1 行で表示

use crate::ports::outbound::EventSinkFactory;
use common::error::Error;
use common::llm::LlmEvent;
use common::ports::outbound::Clock;
use common::sink::{ChatEvent, EventSink};
use std::io::{self, Write};
use std::sync::Arc;

fn flush_stdout() -> Result<(), Error> {
    io::stdout()
        .flush()
        .map_err(|e| Error::io_msg(format!("Failed to flush stdout: {}", e)))
}

/// 標準出力へ表示
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for StdoutSink {
    fn on_event(&mut self, ev: &ChatEvent) -> Result<(), Error> {
        match ev {
            ChatEvent::InputSkipped | ChatEvent::TurnStarted => {
                println!();
            }
            ChatEvent::Llm(LlmEvent::Fragment(f)) => {
                if !f.is_empty() {
                    print!("{}", f.text());
                    flush_stdout()?;
                }
            }
            ChatEvent::Llm(LlmEvent::Completed { .. }) => {}
            ChatEvent::TurnFailed { message } => {
                eprintln!("\nError: {}", message);
            }
        }
        Ok(())
    }

    fn on_end(&mut self) -> Result<(), Error> {
        print!("\n\n");
        flush_stdout()
    }
}

/// `[N fragments, S.SSs, R.RR fragments/s]`
pub fn format_stats(fragments: usize, elapsed_ms: u64) -> String {
    let secs = elapsed_ms as f64 / 1000.0;
    let rate = if secs > 0.0 {
        fragments as f64 / secs
    } else {
        0.0
    };
    format!("[{} fragments, {:.2}s, {:.2} fragments/s]", fragments, secs, rate)
}

/// ターンごとの fragment 数と経過時間を表示する
pub struct StatsSink {
    clock: Arc<dyn Clock>,
    started_ms: Option<u64>,
    fragments: usize,
    failed: bool,
}

impl StatsSink {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            started_ms: None,
            fragments: 0,
            failed: false,
        }
    }

    /// ターン開始から現在までの統計行（開始前なら None）
    pub fn summary(&self) -> Option<String> {
        let started = self.started_ms?;
        let elapsed = self.clock.now_ms().saturating_sub(started);
        Some(format_stats(self.fragments, elapsed))
    }
}

impl EventSink for StatsSink {
    fn on_event(&mut self, ev: &ChatEvent) -> Result<(), Error> {
        match ev {
            ChatEvent::TurnStarted => {
                self.started_ms = Some(self.clock.now_ms());
                self.fragments = 0;
                self.failed = false;
            }
            ChatEvent::Llm(LlmEvent::Fragment(_)) => self.fragments += 1,
            ChatEvent::TurnFailed { .. } => self.failed = true,
            _ => {}
        }
        Ok(())
    }

    fn on_end(&mut self) -> Result<(), Error> {
        if self.failed {
            return Ok(());
        }
        if let Some(line) = self.summary() {
            println!("{}", line);
        }
        Ok(())
    }
}

/// StdoutSink（と指定時は StatsSink）を返すファクトリ
pub struct StdEventSinkFactory {
    clock: Arc<dyn Clock>,
}

impl StdEventSinkFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl EventSinkFactory for StdEventSinkFactory {
    fn create_sinks(&self, show_stats: bool) -> Vec<Box<dyn EventSink>> {
        let mut sinks: Vec<Box<dyn EventSink>> = vec![Box::new(StdoutSink::new())];
        if show_stats {
            sinks.push(Box::new(StatsSink::new(Arc::clone(&self.clock))));
        }
        sinks
    }
}
