//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Upstream transport (HTTP client, plus a mock for offline runs)
//! - Storage (in-memory conversations)
//! - HTTP API exposing the orchestrator

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
