//! HTTP API module.
//!
//! This module provides the HTTP server, account endpoints, API types and
//! the log stream.

pub mod accounts;
pub mod logs;
pub mod server;
pub mod types;

pub use server::{router, start_server, AppState};
pub use types::*;
pub use logs::*;
