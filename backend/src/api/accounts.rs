//! Account endpoints and the session guard for protected routes.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::server::AppState;
use super::types::{LoginRequest, LoginResponse, UserProfile};
use crate::auth::Registration;
use crate::error::{AuthError, ServerError};

/// Name of the session cookie set on login.
pub const SESSION_COOKIE: &str = "session";

/// Session token from `Authorization: Bearer <token>` or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reject requests without a live session when authentication is required.
///
/// On success the caller's [`UserProfile`] is added to the request
/// extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let user = session_token(request.headers())
        .ok_or(AuthError::Unauthorized)
        .and_then(|token| state.accounts.current_user(&token));

    match user {
        Ok(user) => {
            request.extensions_mut().insert(UserProfile::from(user));
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    form: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), ServerError> {
    let Json(form) = form.map_err(json_error)?;
    let user = state.accounts.register(&form)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    form: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(form) = form.map_err(json_error)?;
    let (_, session) = state.accounts.login(&form.email, &form.password)?;

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session.token,
        state.accounts.sessions().lifetime().num_seconds().max(0)
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse::from(session)),
    )
        .into_response())
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ServerError> {
    let token = session_token(&headers).ok_or(AuthError::Unauthorized)?;
    state.accounts.logout(&token);

    let cookie = format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE);
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response())
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<UserProfile>, ServerError> {
    let token = session_token(&headers).ok_or(AuthError::Unauthorized)?;
    let user = state.accounts.current_user(&token)?;
    Ok(Json(user.into()))
}

fn json_error(e: JsonRejection) -> ServerError {
    ServerError::BadRequest(format!("Invalid request body: {}", e.body_text()))
}
