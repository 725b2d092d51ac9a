//! Integration test utilities for the relay
//!
//! Runs the relay dispatcher against an in-process fake world server and a
//! recording chat gateway, and serves the health endpoint on a free port.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
