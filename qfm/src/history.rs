//! Command history.
//!
//! An append-only list of committed lines backed by a newline-delimited file.
//! The file is read once at startup and appended to after every commit, failed
//! commands included. A replay cursor walks the list for Up/Down recall; it
//! always stays inside `[0, len]`, where `len` means "not browsing".

use anyhow::{Context as _, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<String>,
    current_index: usize,
    path: Option<PathBuf>,
}

impl HistoryLog {
    /// A history that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the history file at `path`, creating its parent directory if needed.
    /// A missing file is an empty history.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let entries: Vec<String> = match fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.to_string())
                .collect(),
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        debug!("loaded {} history entries from {:?}", entries.len(), path);

        Ok(HistoryLog {
            current_index: entries.len(),
            entries,
            path: Some(path),
        })
    }

    /// Record a committed line and stop browsing.
    ///
    /// The in-memory log is updated even when the file append fails.
    pub fn append(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            self.reset_index();
            return Ok(());
        }
        self.entries.push(line.to_string());
        self.reset_index();

        if let Some(path) = &self.path {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            writeln!(file, "{line}").with_context(|| format!("failed to append to {}", path.display()))?;
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|s| s.as_str())
    }

    /// Step back one entry. At the oldest entry the cursor stays put and that
    /// entry is returned again.
    pub fn back(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.current_index > 0 {
            self.current_index -= 1;
        }
        self.get(self.current_index)
    }

    /// Step forward one entry. Moving past the newest entry ends browsing and
    /// returns `None`.
    pub fn forward(&mut self) -> Option<&str> {
        if self.current_index < self.entries.len() {
            self.current_index += 1;
        } else {
            debug!("history forward requested while not browsing");
        }
        self.get(self.current_index)
    }

    pub fn reset_index(&mut self) {
        self.current_index = self.entries.len();
    }

    /// True when the cursor is past the newest entry.
    pub fn at_end(&self) -> bool {
        self.current_index == self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    fn log_with(lines: &[&str]) -> HistoryLog {
        let mut history = HistoryLog::in_memory();
        for line in lines {
            history.append(line).unwrap();
        }
        history
    }

    #[test]
    fn test_back_clamps_at_oldest() {
        init();
        let mut history = log_with(&["a", "b"]);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.back(), Some("b"));
        assert_eq!(history.back(), Some("a"));
        assert_eq!(history.back(), Some("a"));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_forward_ends_browsing() {
        init();
        let mut history = log_with(&["a", "b"]);
        history.back();
        history.back();
        assert_eq!(history.forward(), Some("b"));
        assert_eq!(history.forward(), None);
        assert!(history.at_end());
        assert_eq!(history.forward(), None);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn test_empty_history_does_not_move() {
        init();
        let mut history = HistoryLog::in_memory();
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), None);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_append_resets_cursor() {
        init();
        let mut history = log_with(&["a", "b"]);
        history.back();
        history.append("c").unwrap();
        assert!(history.at_end());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_persisted_round_trip() -> Result<()> {
        init();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("history");
        {
            let mut history = HistoryLog::open(&path)?;
            assert!(history.is_empty());
            history.append("docs::newdir")?;
            history.append("->logs")?;
        }
        let history = HistoryLog::open(&path)?;
        assert_eq!(history.entries(), &["docs::newdir", "->logs"]);
        assert!(history.at_end());
        Ok(())
    }
}
