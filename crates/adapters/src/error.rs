// SPDX-License-Identifier: MIT
//! Executor-level error kinds (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("executor unreachable: {0}")]
    LaunchError(String),

    #[error("inactivity guard tripped after {elapsed_secs:.1}s with no activity")]
    InactivityTimeout { elapsed_secs: f64 },

    #[error("executor process crashed: {0}")]
    Crashed(String),

    #[error("executor interrupted")]
    Interrupted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
