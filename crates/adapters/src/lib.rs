// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oneshot-executor: the polymorphic executor abstraction (C1) and the
//! streaming pipeline (C2) that pumps its output through an inactivity
//! guard into the activity log (spec §4.1, §4.2).

pub mod error;
pub mod executor;
pub mod http;
pub mod pipeline;
pub mod registry;
pub mod subprocess;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use error::ExecuteError;
pub use executor::{ExecutionStream, Executor, ExecutorMetadata};
pub use http::{DirectHttpExecutor, DirectHttpExecutorConfig};
pub use registry::ExecutorRegistry;
pub use subprocess::{SubprocessExecutor, SubprocessExecutorConfig, DEFAULT_GRACE_PERIOD};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ExecuteCall, FakeExecutor};
