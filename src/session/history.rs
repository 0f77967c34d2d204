//! # Command History
//!
//! Command lines entered at the prompt, persisted one per line:
//!
//! ```text
//! ~/.config/dtsh/
//! ├── config.json
//! └── dtsh_history
//! ```
//!
//! The file is read once when the session opens and written once when it
//! closes. Only the last `max` entries are kept.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the history file inside the config directory.
pub const HISTORY_FILE: &str = "dtsh_history";

#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    entries: Vec<String>,
    max: usize,
}

impl History {
    /// An empty history, saved to `path`.
    pub fn new(path: PathBuf, max: usize) -> Self {
        Self {
            path,
            entries: Vec::new(),
            max,
        }
    }

    /// Load the history file at `path`. A missing file is an empty history.
    pub fn load(path: PathBuf, max: usize) -> Result<Self> {
        let mut history = Self::new(path, max);
        if !history.path.exists() {
            tracing::debug!(path = %history.path.display(), "no history file");
            return Ok(history);
        }

        let contents = fs::read_to_string(&history.path)
            .with_context(|| format!("Failed to read history file: {}", history.path.display()))?;
        for line in contents.lines() {
            history.push(line);
        }
        tracing::debug!(entries = history.entries.len(), "history loaded");
        Ok(history)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a command line. Blank lines and repeats of the previous entry
    /// are ignored.
    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.entries.last().is_some_and(|last| last == line) {
            return;
        }
        self.entries.push(line.to_string());
        if self.entries.len() > self.max {
            let excess = self.entries.len() - self.max;
            self.entries.drain(..excess);
        }
    }

    /// Write the history file, creating its directory if needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }

        let mut contents = self.entries.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))?;

        tracing::debug!(entries = self.entries.len(), path = %self.path.display(), "history saved");
        Ok(())
    }
}
