// SPDX-License-Identifier: MIT
//! Executor Registry (C8): name → executor constructor mapping, grounded on
//! `original_source/src/oneshot/providers/executor_registry.py`'s
//! classmethod-based registry pattern, adapted to a `HashMap` of boxed
//! constructor closures behind a `parking_lot::Mutex` (this crate's
//! equivalent of the teacher's class-level registry state).

use crate::executor::{Executor, ExecutorMetadata};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type Constructor = Arc<dyn Fn() -> Arc<dyn Executor> + Send + Sync>;

#[derive(Clone)]
struct Entry {
    metadata: ExecutorMetadata,
    construct: Constructor,
}

/// A process-wide catalogue of known executor kinds. The CLI's `--executor`
/// flag resolves against this; `describe()` feeds its help text.
#[derive(Default)]
pub struct ExecutorRegistry {
    entries: Mutex<HashMap<String, Entry>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        metadata: ExecutorMetadata,
        construct: impl Fn() -> Arc<dyn Executor> + Send + Sync + 'static,
    ) {
        self.entries.lock().insert(
            metadata.name.clone(),
            Entry {
                metadata,
                construct: Arc::new(construct),
            },
        );
    }

    pub fn unregister(&self, name: &str) {
        self.entries.lock().remove(name);
    }

    pub fn create(&self, name: &str) -> Option<Arc<dyn Executor>> {
        self.entries.lock().get(name).map(|e| (e.construct)())
    }

    pub fn metadata(&self, name: &str) -> Option<ExecutorMetadata> {
        self.entries.lock().get(name).map(|e| e.metadata.clone())
    }

    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Human-readable summary for the CLI's `--executor` help text.
    pub fn describe(&self) -> Vec<String> {
        self.available_names()
            .into_iter()
            .filter_map(|name| {
                let meta = self.metadata(&name)?;
                Some(format!(
                    "{name} (git-recovery: {}, model-selection: {})",
                    meta.captures_git, meta.supports_model_selection
                ))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
