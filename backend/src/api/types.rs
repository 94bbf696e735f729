//! REST API types and error mapping.
//!
//! Failures always carry a JSON body of the form `{ "error": "<message>" }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{Session, User};
use crate::error::{AuthError, ProcessError, ServerError};

/// Suggested file name of the processed download.
pub const OUTPUT_FILE_NAME: &str = "processed_cleaned.xlsx";

/// Login form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response to a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    pub cu_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            cu_id: session.cu_id,
            expires_at: session.expires_at,
        }
    }
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub cu_id: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            cu_id: user.cu_id,
            email: user.email,
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({ "error": error })
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Process(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::Process(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Auth(e) => auth_status(e),
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCuId
        | AuthError::InvalidPassword(_)
        | AuthError::PasswordMismatch
        | AuthError::InvalidEmail(_)
        | AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
        AuthError::CuIdTaken(_) | AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(error_response(&self.to_string()))).into_response()
    }
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        ServerError::from(self).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServerError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_status_mapping() {
        let status = |e: ServerError| e.status_code();

        assert_eq!(status(ProcessError::MissingFile.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status(ProcessError::EmptyTable.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ProcessError::NoSuchColumn("Student".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ProcessError::Codec(CodecError::NoWorksheet).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status(AuthError::EmailTaken.into()), StatusCode::CONFLICT);
        assert_eq!(status(AuthError::Unauthorized.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(ServerError::PayloadTooLarge("too big".into())),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_error_body() {
        let body = error_response("No file uploaded");
        assert_eq!(body, json!({ "error": "No file uploaded" }));
    }

    #[test]
    fn test_messages_pass_through() {
        let err: ServerError = ProcessError::NoSuchColumn("Student".into()).into();
        assert_eq!(err.to_string(), "No \"Student\" column found");
    }
}
