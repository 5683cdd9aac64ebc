// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oneshot-storage: crash-safe persistence for a task's durable context and
//! its append-only activity log (spec §4.3, §4.2).

pub mod activity_log;
pub mod context;
pub mod error;

pub use activity_log::{read_events, ActivityLogWriter};
pub use context::{ContextWriter, DurableContext, FsContextWriter};
pub use error::StorageError;
