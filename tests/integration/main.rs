//! Integration test binary -- all integration tests consolidated into a single
//! binary.

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod helpers;

mod config_roundtrip;
mod message_flow;
mod store_persistence;
