//! Rollcall: availability tracking for chat groups.
//!
//! Free-text chat messages are scanned for availability statements, the
//! implied time is resolved, the author confirms through a private prompt,
//! and the result is kept in a bounded per-user record:
//! message → intent → time → confirmation → store
//!
//! # Architecture
//!
//! - **Intent**: trigger phrase banks and clause extraction ([`intent`])
//! - **Temporal**: natural-language clause → UTC instant ([`temporal`])
//! - **Workflow**: accept/reject round trip before any write ([`workflow`])
//! - **Availability**: per-user JSON files with FIFO eviction ([`availability`])
//! - **Channels**: gateway/reply traits and the Discord adapter ([`channels`])

pub mod availability;
pub mod channels;
pub mod commands;
pub mod config;
pub mod error;
pub mod intent;
pub mod logging;
pub mod rollcall_dirs;
pub mod runtime;
pub mod temporal;
pub mod workflow;

#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) mod test_utils;

pub use availability::{AvailabilityRecord, AvailabilityStore, UserAvailabilityCollection};
pub use config::RollcallConfig;
pub use error::{Result, RollcallError};
pub use intent::{Classification, Intent, IntentClassifier};
pub use runtime::RuntimeContext;
pub use temporal::TimeResolver;
pub use workflow::ConfirmationWorkflow;
