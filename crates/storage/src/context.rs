// SPDX-License-Identifier: MIT
//! Durable context: the crash-safe, atomically-written home for a single
//! task's [`Task`] snapshot (spec §4.3).
//!
//! Every mutation goes through [`DurableContext::save`], which writes the
//! full snapshot to a temporary file in the same directory, fsyncs it,
//! renames it over the real path, and (best-effort) fsyncs the directory.
//! That sequence is what makes a reader never observe a half-written file:
//! either the old snapshot is still there, or the complete new one is.

use crate::error::StorageError;
use oneshot_core::{Task, TaskId, TaskState};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Abstracts the filesystem calls behind an atomic write, so tests can swap
/// in a fake that injects failures between steps without touching a real
/// disk.
pub trait ContextWriter: Send + Sync + 'static {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), StorageError>;
    fn fsync_file(&self, path: &Path) -> Result<(), StorageError>;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError>;
    fn fsync_dir(&self, path: &Path) -> Result<(), StorageError>;
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError>;
    /// Best-effort removal of a leftover temporary file. Callers never
    /// propagate this call's own failure — it only ever runs while already
    /// unwinding from a worse error.
    fn remove(&self, path: &Path) -> Result<(), StorageError>;
}

/// Production writer: real files, real fsyncs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContextWriter;

impl ContextWriter for FsContextWriter {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        Ok(())
    }

    fn fsync_file(&self, path: &Path) -> Result<(), StorageError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        std::fs::rename(from, to)?;
        Ok(())
    }

    fn fsync_dir(&self, path: &Path) -> Result<(), StorageError> {
        // Directory fsync is best-effort: some platforms (notably Windows)
        // can't open a directory for reading. Swallow that one failure mode.
        match File::open(path) {
            Ok(dir) => {
                let _ = dir.sync_all();
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }

    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, path: &Path) -> Result<(), StorageError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The durable, crash-safe home for one [`Task`]. Every accessor that
/// mutates state immediately persists via [`Self::save`] — callers never
/// hold dirty, unpersisted state across an `await` point or a fallible
/// external call.
pub struct DurableContext<W: ContextWriter = FsContextWriter> {
    path: PathBuf,
    writer: W,
    task: Task,
}

impl DurableContext<FsContextWriter> {
    /// Load an existing context, or create a new one in `CREATED` state if
    /// no file exists at `path` yet.
    pub fn open(path: impl Into<PathBuf>, id: TaskId, max_iterations: u32, now: f64) -> Result<Self, StorageError> {
        Self::open_with_writer(FsContextWriter, path, id, max_iterations, now)
    }
}

impl<W: ContextWriter> DurableContext<W> {
    pub fn open_with_writer(
        writer: W,
        path: impl Into<PathBuf>,
        id: TaskId,
        max_iterations: u32,
        now: f64,
    ) -> Result<Self, StorageError> {
        let path = path.into();
        let existing = writer.read(&path)?;
        let is_new = existing.is_none();
        let task = match existing {
            Some(bytes) => Self::parse_and_migrate(&path, &bytes, now)?,
            None => Task::new(id, max_iterations, now),
        };
        let mut ctx = Self { path, writer, task };
        if is_new {
            ctx.save()?;
        }
        Ok(ctx)
    }

    fn parse_and_migrate(path: &Path, bytes: &[u8], now: f64) -> Result<Task, StorageError> {
        let mut value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| StorageError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Task::migrate(&mut value, now);
        serde_json::from_value(value).map_err(|e| StorageError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full current snapshot atomically: tmp file, fsync, rename,
    /// directory fsync (spec §4.3).
    pub fn save(&mut self) -> Result<(), StorageError> {
        let tmp_path = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(&self.task)?;

        if let Err(e) = self.writer.write_tmp(&tmp_path, &bytes) {
            let _ = self.writer.remove(&tmp_path);
            return Err(StorageError::Persist {
                path: self.path.display().to_string(),
                source: std::io::Error::other(e.to_string()),
            });
        }
        if let Err(e) = self.writer.fsync_file(&tmp_path) {
            let _ = self.writer.remove(&tmp_path);
            return Err(e);
        }
        // Past this point the tmp file is either renamed away or still sitting
        // there under its own name — nothing left to clean up on failure.
        self.writer.rename(&tmp_path, &self.path)?;
        if let Some(parent) = self.path.parent() {
            self.writer.fsync_dir(parent)?;
        }
        Ok(())
    }

    pub fn get_state(&self) -> TaskState {
        self.task.state
    }

    pub fn set_state(
        &mut self,
        state: TaskState,
        now: f64,
        reason: Option<String>,
        pid: Option<u32>,
    ) -> Result<(), StorageError> {
        self.task.record_transition(state, now, reason, pid);
        self.save()
    }

    pub fn get_worker_result(&self) -> Option<&str> {
        self.task.worker_result.as_deref()
    }

    pub fn set_worker_result(&mut self, result: impl Into<String>, now: f64) -> Result<(), StorageError> {
        self.task.set_worker_result(result, now);
        self.save()
    }

    /// Persist the full Result Extractor output (result plus its leading and
    /// trailing context windows and score), so a resumed run can rebuild the
    /// same Auditor prompt the original run sent.
    pub fn set_worker_summary(
        &mut self,
        summary: oneshot_core::ResultSummary,
        now: f64,
    ) -> Result<(), StorageError> {
        self.task.set_worker_summary(summary, now);
        self.save()
    }

    pub fn get_worker_summary(&self) -> Option<oneshot_core::ResultSummary> {
        self.task.worker_summary()
    }

    pub fn get_auditor_result(&self) -> Option<&str> {
        self.task.auditor_result.as_deref()
    }

    pub fn set_auditor_result(&mut self, result: impl Into<String>, now: f64) -> Result<(), StorageError> {
        self.task.set_auditor_result(result, now);
        self.save()
    }

    pub fn increment_iteration(&mut self, now: f64) -> Result<u32, StorageError> {
        self.task.increment_iteration(now);
        self.save()?;
        Ok(self.task.iteration_count)
    }

    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.task.get_metadata(key)
    }

    pub fn set_metadata(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
        now: f64,
    ) -> Result<(), StorageError> {
        self.task.set_metadata(key, value, now);
        self.save()
    }

    pub fn get_variable(&self, key: &str) -> Option<&serde_json::Value> {
        self.task.get_variable(key)
    }

    pub fn set_variable(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
        now: f64,
    ) -> Result<(), StorageError> {
        self.task.set_variable(key, value, now);
        self.save()
    }

    pub fn to_snapshot(&self) -> Task {
        self.task.clone()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
