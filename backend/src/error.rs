//! Error types for the Excel-Split backend.
//!
//! Each layer has its own error enum:
//!
//! - [`CodecError`] - spreadsheet decode/encode errors
//! - [`SplitError`] - column splitting errors
//! - [`ProcessError`] - upload processing errors (what the HTTP layer sees)
//! - [`AuthError`] - account and session errors
//! - [`ConfigError`] - configuration errors
//! - [`ServerError`] - top-level HTTP errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Codec Errors
// =============================================================================

/// Errors while reading an uploaded spreadsheet or writing the result.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Text upload could not be decoded.
    #[error("Failed to decode text: {0}")]
    Encoding(String),

    /// Workbook container could not be opened or read.
    #[error("Unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// Workbook has no sheet to read.
    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    /// Delimited text could not be parsed.
    #[error("Invalid delimited text: {0}")]
    Delimited(#[from] csv::Error),

    /// Output workbook could not be written.
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// Table does not fit in a worksheet.
    #[error("Table too large for a worksheet: {0}")]
    TooLarge(String),
}

// =============================================================================
// Split Errors
// =============================================================================

/// Errors from the column splitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// The table has no rows at all, not even a header.
    #[error("Excel file is empty")]
    EmptyTable,

    /// No header cell matches the target column name.
    #[error("No \"{0}\" column found")]
    NoSuchColumn(String),
}

// =============================================================================
// Processing Errors
// =============================================================================

/// Errors while processing one upload end-to-end.
///
/// The HTTP layer maps `MissingFile`, `EmptyTable` and `NoSuchColumn` to
/// `400 Bad Request` and `Codec` to `500 Internal Server Error`.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// No file part in the upload.
    #[error("No file uploaded")]
    MissingFile,

    /// Decoded table has zero rows.
    #[error("Excel file is empty")]
    EmptyTable,

    /// Header lacks the target column.
    #[error("No \"{0}\" column found")]
    NoSuchColumn(String),

    /// Decode or encode failure.
    #[error("Failed to process file: {0}")]
    Codec(#[from] CodecError),
}

impl From<SplitError> for ProcessError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::EmptyTable => ProcessError::EmptyTable,
            SplitError::NoSuchColumn(name) => ProcessError::NoSuchColumn(name),
        }
    }
}

impl ProcessError {
    /// Whether the error is caused by the shape of the user's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ProcessError::Codec(_))
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors from account registration, login and session checks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// CU ID is not `CU` followed by 3-8 digits.
    #[error("CU ID must match format: CU followed by 3-8 digits (e.g., CU12345)")]
    InvalidCuId,

    /// Password violates the password policy.
    #[error("{0}")]
    InvalidPassword(String),

    /// Password and its confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Email address is malformed.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// A required field is empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// CU ID is already registered.
    #[error("CU ID already registered: {0}")]
    CuIdTaken(String),

    /// Email is already registered.
    #[error("Email address is already registered")]
    EmailTaken,

    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, unknown or expired session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while resolving server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting is unparseable or out of range.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Upload processing error.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Account or session error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Upload exceeds the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for split operations.
pub type SplitResult<T> = Result<T, SplitError>;

/// Result type for upload processing.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Result type for account operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SplitError -> ProcessError
        let err: ProcessError = SplitError::NoSuchColumn("Student".into()).into();
        assert!(matches!(err, ProcessError::NoSuchColumn(ref name) if name == "Student"));
        assert_eq!(err.to_string(), "No \"Student\" column found");

        // CodecError -> ProcessError -> ServerError
        let err: ProcessError = CodecError::NoWorksheet.into();
        assert!(!err.is_client_error());
        let err: ServerError = err.into();
        assert!(err.to_string().contains("no worksheet"));
    }

    #[test]
    fn test_client_errors() {
        assert!(ProcessError::MissingFile.is_client_error());
        assert!(ProcessError::EmptyTable.is_client_error());
        assert!(ProcessError::NoSuchColumn("x".into()).is_client_error());
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(ProcessError::MissingFile.to_string(), "No file uploaded");
        assert_eq!(SplitError::EmptyTable.to_string(), "Excel file is empty");
        assert_eq!(AuthError::PasswordMismatch.to_string(), "Passwords do not match");
    }
}
