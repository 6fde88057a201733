//! ユースケース層のテスト（スタブエンジン・台本入力・記録用 Sink）


use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::domain::HomeDir;
use common::error::Error;
use common::ports::outbound::{Clock, EnvResolver};
use common::sink::{ChatEvent, EventSink};

use crate::ports::outbound::{EventSinkFactory, InterruptChecker, OperatorPrompt};

/// Sink が受け取ったイベントと on_end の回数
#[derive(Debug, Default)]
pub struct Recorded {
    pub events: Vec<ChatEvent>,
    pub ends: usize,
}

impl Recorded {
    /// 表示された fragment の連結
    pub fn displayed_text(&self) -> String {
        self.events
            .iter()
            .filter_map(|ev| match ev {
                ChatEvent::Llm(common::llm::LlmEvent::Fragment(f)) => Some(f.text()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&ChatEvent) -> bool) -> usize {
        self.events.iter().filter(|ev| pred(ev)).count()
    }
}

struct RecordingSink {
    shared: Arc<Mutex<Recorded>>,
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, ev: &ChatEvent) -> Result<(), Error> {
        self.shared.lock().unwrap().events.push(ev.clone());
        Ok(())
    }

    fn on_end(&mut self) -> Result<(), Error> {
        self.shared.lock().unwrap().ends += 1;
        Ok(())
    }
}

/// すべてのターンのイベントを 1 か所に記録するファクトリ
#[derive(Default)]
pub struct RecordingSinkFactory {
    pub recorded: Arc<Mutex<Recorded>>,
}

impl EventSinkFactory for RecordingSinkFactory {
    fn create_sinks(&self, _show_stats: bool) -> Vec<Box<dyn EventSink>> {
        vec![Box::new(RecordingSink {
            shared: Arc::clone(&self.recorded),
        })]
    }
}

/// 生成開始後、n 個目のイベントまでは通し、その次から中断を報告する
pub struct InterruptAfter {
    allowed: usize,
    seen: AtomicUsize,
    generating: AtomicBool,
}

impl InterruptAfter {
    pub fn new(allowed: usize) -> Self {
        Self {
            allowed,
            seen: AtomicUsize::new(0),
            generating: AtomicBool::new(false),
        }
    }
}

impl InterruptChecker for InterruptAfter {
    fn is_interrupted(&self) -> bool {
        if !self.generating.load(Ordering::SeqCst) {
            return false;
        }
        self.seen.fetch_add(1, Ordering::SeqCst) >= self.allowed
    }

    fn set_generating(&self, generating: bool) {
        self.seen.store(0, Ordering::SeqCst);
        self.generating.store(generating, Ordering::SeqCst);
    }
}

/// 呼ばれるたびに 250ms 進む時計
#[derive(Default)]
pub struct StepClock(AtomicU64);

impl Clock for StepClock {
    fn now_ms(&self) -> u64 {
        self.0.fetch_add(250, Ordering::SeqCst)
    }
}

/// 固定のホームディレクトリを返す EnvResolver
pub struct FixedHome(pub PathBuf);

impl EnvResolver for FixedHome {
    fn resolve_home_dir(&self) -> Result<HomeDir, Error> {
        Ok(HomeDir::new(self.0.clone()))
    }
}

/// 呼ばれたら（残っていれば）モデルファイルを置いて Enter 扱い。尽きたら EOF
pub struct PlacingOperator {
    files: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl PlacingOperator {
    pub fn new(files: &[&str]) -> Self {
        Self {
            files: Mutex::new(files.iter().rev().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn eof() -> Self {
        Self::new(&[])
    }
}

impl OperatorPrompt for PlacingOperator {
    fn wait_for_model(&self, dir: &Path, _extension: &str) -> Result<bool, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.files.lock().unwrap().pop() {
            Some(name) => {
                std::fs::write(dir.join(name), b"GGUF").unwrap();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
