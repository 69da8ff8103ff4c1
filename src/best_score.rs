//! Best score persistence: a single decimal number in a text file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestScoreFile {
    path: PathBuf,
}

impl BestScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored score. A missing file means 0.
    pub fn load(&self) -> Result<u32> {
        match fs::read_to_string(&self.path) {
            Ok(text) => text
                .trim()
                .parse()
                .with_context(|| format!("corrupt best score in {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    /// Like [`BestScoreFile::load`], but logs failures and falls back to 0.
    pub fn load_or_zero(&self) -> u32 {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring stored best score");
            0
        })
    }

    pub fn store(&self, best: u32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{best}\n"))
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Store, logging instead of failing; the game goes on either way.
    pub fn store_or_warn(&self, best: u32) {
        if let Err(e) = self.store(best) {
            warn!(error = %e, best, "could not persist best score");
        }
    }
}
