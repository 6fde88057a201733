//! モデル配置を端末で促す OperatorPrompt 実装

use crate::ports::outbound::{LineReader, OperatorPrompt};
use common::error::Error;
use std::path::Path;
use std::sync::Arc;

pub struct CliOperatorPrompt {
    reader: Arc<dyn LineReader>,
}

impl CliOperatorPrompt {
    pub fn new(reader: Arc<dyn LineReader>) -> Self {
        Self { reader }
    }

    pub fn message(dir: &Path, extension: &str) -> String {
        format!(
            "Place a .{} model in \"{}\" folder and press Enter...",
            extension.trim_start_matches('.'),
            dir.display()
        )
    }
}

impl OperatorPrompt for CliOperatorPrompt {
    fn wait_for_model(&self, dir: &Path, extension: &str) -> Result<bool, Error> {
        let line = self.reader.read_line(&Self::message(dir, extension))?;
        Ok(line.is_some())
    }
}
