// SPDX-License-Identifier: MIT
//! Append-only NDJSON activity log: one [`ActivityEvent`] per line, flushed
//! immediately after every write so a reader tailing the file (or a crash
//! recovery pass) never sees a truncated trailing line (spec §4.2, §4.3).

use crate::error::StorageError;
use oneshot_core::ActivityEvent;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub struct ActivityLogWriter {
    path: PathBuf,
    file: File,
}

impl ActivityLogWriter {
    /// Open (creating if absent) an activity log for append. `keep_log`
    /// callers are responsible for deleting the file themselves once a task
    /// reaches a terminal state (spec §4.6).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single NDJSON line, flushing immediately.
    pub fn append(&mut self, event: &ActivityEvent) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.file.write_all(&line).map_err(|source| StorageError::Append {
            path: self.path.display().to_string(),
            source,
        })?;
        self.file.flush().map_err(|source| StorageError::Append {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(())
    }

    /// Remove the log file from disk. Called once a task completes unless
    /// `--keep-log` was requested.
    pub fn remove(self) -> Result<(), StorageError> {
        drop(self.file);
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Read every well-formed event from an NDJSON activity log. A trailing
/// partial line (as left by a crash mid-write) is silently dropped rather
/// than treated as corruption — forensic recovery expects this.
pub fn read_events(path: &Path) -> Result<Vec<ActivityEvent>, StorageError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let reader = BufReader::new(file);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ActivityEvent>(&line) {
            Ok(event) => events.push(event),
            Err(_) => break,
        }
    }
    Ok(events)
}

#[cfg(test)]
#[path = "activity_log_tests.rs"]
mod tests;

