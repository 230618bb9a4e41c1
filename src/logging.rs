use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Env, Target};

const MAX_CONSOLE_LINES: usize = 50;

/// Sends `log` records to `path` so they never draw over the terminal UI.
/// Level comes from `RUST_LOG`, default `info`.
pub fn init_file_logger(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("install logger")?;
    Ok(())
}

/// Recent user-facing messages shown in the console panel.
#[derive(Debug, Clone, Default)]
pub struct Console {
    lines: VecDeque<String>,
}

impl Console {
    pub fn push(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::info!("{msg}");
        self.lines.push_back(msg);
        while self.lines.len() > MAX_CONSOLE_LINES {
            self.lines.pop_front();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The newest `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<&str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(String::as_str).collect()
    }
}
