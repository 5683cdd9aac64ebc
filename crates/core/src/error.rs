// SPDX-License-Identifier: MIT
//! Core-level error kinds (spec §7), shared by every other crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] crate::state::InvalidTransition),
    #[error("max iterations exceeded: {iteration_count} > {max_iterations}")]
    MaxIterations {
        iteration_count: u32,
        max_iterations: u32,
    },
}
