//! 標準入力から 1 行読む LineReader 実装

use crate::ports::outbound::LineReader;
use common::error::Error;
use std::io::{self, BufRead, Write};

pub struct StdinLineReader;

impl StdinLineReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdinLineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader for StdinLineReader {
    fn read_line(&self, prompt: &str) -> Result<Option<String>, Error> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)
            .and_then(|_| stdout.flush())
            .map_err(|e| Error::io_msg(format!("Failed to write prompt: {}", e)))?;

        let mut line = String::new();
        let n = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::io_msg(format!("Failed to read from stdin: {}", e)))?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}
