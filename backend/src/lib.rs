//! # Excel-Split - split a Student column into Name and Student Number
//!
//! Staff upload a spreadsheet whose `Student` column holds values such as
//! `"Jane Smith (54321)"` or `"John Doe 12345"` and download a copy where
//! that column became two: `Name` and `Student Number`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Upload    │────▶│   Parser    │────▶│  Splitter   │────▶│   Writer    │
//! │ (multipart) │     │ (xlsx/csv)  │     │  (Student)  │     │   (.xlsx)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use excel_split::{split, Cell, Table};
//!
//! let table = Table::new(vec![
//!     vec!["Student".into(), "Course".into()],
//!     vec!["Jane Smith (54321)".into(), "Math".into()],
//! ]);
//! let out = split(table, "student").unwrap();
//! assert_eq!(out.rows()[1][1], Cell::from("54321"));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Cell / Row / Table
//! - [`parser`] - Spreadsheet decode and encode
//! - [`transform`] - Column splitter and upload pipeline
//! - [`auth`] - Accounts and sessions
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Codec
pub mod parser;

// Transformation
pub mod transform;

// Accounts
pub mod auth;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AuthError, CodecError, ConfigError, ProcessError, ServerError, SplitError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, Row, Table};

// =============================================================================
// Re-exports - Codec
// =============================================================================

pub use parser::{decode_bytes, decode_file, encode_xlsx, DecodedTable, SourceFormat};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::splitter::{
    find_column, parse_student, split, ColumnSplitter, SplitReport, StudentId,
};

pub use transform::pipeline::{
    cleaned_path, process_bytes, process_file, ProcessOptions, ProcessOutput, ProcessSummary,
    DEFAULT_TARGET_COLUMN, OUTPUT_SHEET_NAME,
};

// =============================================================================
// Re-exports - Accounts / Config
// =============================================================================

pub use auth::{Accounts, Registration, User};
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}

pub mod pipeline {
    pub use crate::transform::pipeline::*;
}
