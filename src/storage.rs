//! File access for database files.
//!
//! The library only works on bytes; the command line front end reads them off
//! the disk here.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

/// Largest file accepted by [`Storage::load`] (256 MiB).
const MAX_FILE_LEN: u64 = 256 * 1024 * 1024;

/// Location of a database file on disk.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance with the given path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns `true` if the database file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the entire database file into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or implausibly large.
    pub fn load(&self) -> Result<Vec<u8>> {
        if !self.exists() {
            bail!("database file {} does not exist", self.path.display());
        }

        let len = fs::metadata(&self.path)
            .with_context(|| format!("failed to stat {}", self.path.display()))?
            .len();
        if len > MAX_FILE_LEN {
            bail!("database file {} is too large ({len} bytes)", self.path.display());
        }

        let data = fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "database file loaded");
        Ok(data)
    }
}
