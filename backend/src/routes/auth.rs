//! Login, password recovery and token verification endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use simple_login_common::{
    LoginRequest, LoginResponse, RecoveryRequest, RecoveryResponse, SessionResponse,
};

use crate::error::{Error, Result, SessionError};
use crate::AppState;

/// Build the auth router, mounted under `/api/auth`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/remember-password", post(remember_password))
        .route("/verify-token", get(verify_token))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn invalid_body(rejection: JsonRejection) -> Error {
    Error::Validation(format!("Invalid request body: {}", rejection.body_text()))
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = payload.map_err(invalid_body)?;
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let session = state.issuer.login(&email, &password).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: session.token,
        user: session.user,
    }))
}

/// POST /api/auth/remember-password
///
/// Confirms the account exists. No mail is actually sent.
async fn remember_password(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RecoveryRequest>, JsonRejection>,
) -> Result<Json<RecoveryResponse>> {
    let Json(request) = payload.map_err(invalid_body)?;
    let email = request.email.unwrap_or_default();

    let user = state.issuer.request_recovery(&email).await?;

    Ok(Json(RecoveryResponse {
        success: true,
        message: format!("Recovery email sent to {}. Check your inbox.", email),
        user,
    }))
}

/// GET /api/auth/verify-token
async fn verify_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>> {
    let token = bearer_token(&headers).ok_or(SessionError::NoToken)?;

    let user = state.issuer.verify_session(token).await?;

    Ok(Json(SessionResponse {
        success: true,
        message: "Token valid".to_string(),
        user,
    }))
}
