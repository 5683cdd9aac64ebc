// SPDX-License-Identifier: MIT
//! Engine-level error kinds (spec §7), the terminal boundary that translates
//! every lower-layer failure into either a state-machine event or a fatal
//! report to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    InvalidTransition(#[from] oneshot_core::InvalidTransition),

    #[error(transparent)]
    Storage(#[from] oneshot_storage::StorageError),

    #[error(transparent)]
    Execute(#[from] oneshot_executor::ExecuteError),

    #[error("engine interrupted before reaching a terminal state")]
    Interrupted,

    #[error("no executor registered for {0:?}")]
    NoSuchExecutor(String),
}
