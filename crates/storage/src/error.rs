// SPDX-License-Identifier: MIT
//! Storage-level error kinds (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("durable context at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("failed to persist durable context to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("activity log at {path} could not be appended: {source}")]
    Append {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
