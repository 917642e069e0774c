//! Error types for the authentication service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use simple_login_common::{ErrorCode, ErrorResponse};

use crate::auth::lockout::{describe_lock_duration, format_lock_time};
use crate::auth::token::TokenError;
use crate::store::StoreError;

/// Reasons a session token is refused.
///
/// These stay distinct for logging and in the response body, but all of
/// them map to 401 at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Token not provided")]
    NoToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Token subject no longer exists")]
    UserNotFound,

    #[error("Account locked for another {remaining_ms} ms")]
    AccountLocked { remaining_ms: u64 },
}

/// Outcome of a failed auth operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown email (no count) or wrong password (with the attempts left).
    #[error("Invalid credentials")]
    InvalidCredentials { remaining_attempts: Option<u32> },

    /// `locked_for` is set when this very request caused the lock.
    #[error("Account locked for another {remaining_ms} ms")]
    AccountLocked {
        remaining_ms: u64,
        locked_for: Option<chrono::Duration>,
    },

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Internal(format!("user store: {}", e))
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation(_) => ErrorCode::ValidationError,
            Error::InvalidCredentials { .. } => ErrorCode::InvalidCredentials,
            Error::AccountLocked { .. } => ErrorCode::AccountLocked,
            Error::UserNotFound => ErrorCode::UserNotFound,
            Error::Session(SessionError::NoToken) => ErrorCode::NoToken,
            Error::Session(SessionError::InvalidToken(_)) => ErrorCode::InvalidToken,
            Error::Session(SessionError::UserNotFound) => ErrorCode::UserNotFound,
            Error::Session(SessionError::AccountLocked { .. }) => ErrorCode::AccountLocked,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Error::AccountLocked { .. } => StatusCode::LOCKED,
            Error::UserNotFound => StatusCode::NOT_FOUND,
            Error::Session(_) => StatusCode::UNAUTHORIZED,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body. Internal details never leave the process.
    pub fn body(&self) -> ErrorResponse {
        let code = self.code();
        match self {
            Error::Validation(message) => ErrorResponse::new(code, message.clone()),
            Error::InvalidCredentials {
                remaining_attempts: None,
            } => ErrorResponse::new(code, "Invalid email or password"),
            Error::InvalidCredentials {
                remaining_attempts: Some(attempts),
            } => ErrorResponse::new(
                code,
                format!("Invalid email or password. Remaining attempts: {}", attempts),
            )
            .with_remaining_attempts(*attempts),
            Error::AccountLocked {
                remaining_ms,
                locked_for: None,
            }
            | Error::Session(SessionError::AccountLocked { remaining_ms }) => ErrorResponse::new(
                code,
                format!("Account locked. Try again in {}", format_lock_time(*remaining_ms)),
            )
            .with_remaining_time(*remaining_ms),
            Error::AccountLocked {
                remaining_ms,
                locked_for: Some(duration),
            } => ErrorResponse::new(
                code,
                format!(
                    "Account locked for {} due to multiple failed attempts. Try again in {}",
                    describe_lock_duration(*duration),
                    format_lock_time(*remaining_ms)
                ),
            )
            .with_remaining_time(*remaining_ms),
            Error::UserNotFound => ErrorResponse::new(code, "No user found with this email"),
            Error::Session(SessionError::NoToken) => ErrorResponse::new(code, "Token not provided"),
            Error::Session(SessionError::InvalidToken(_)) => {
                ErrorResponse::new(code, "Invalid or expired token")
            }
            Error::Session(SessionError::UserNotFound) => ErrorResponse::new(code, "User not found"),
            Error::Internal(_) => ErrorResponse::new(code, "Internal server error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Error::Internal(detail) = &self {
            tracing::error!("Internal error: {}", detail);
        }

        (self.status(), Json(self.body())).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::InvalidCredentials { remaining_attempts: None }.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::AccountLocked { remaining_ms: 1, locked_for: None }.status(),
            StatusCode::LOCKED
        );
        assert_eq!(Error::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Internal("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_session_failures_collapse_to_unauthorized() {
        let failures = [
            SessionError::NoToken,
            SessionError::InvalidToken(TokenError::Expired),
            SessionError::UserNotFound,
            SessionError::AccountLocked { remaining_ms: 10 },
        ];
        for failure in failures {
            assert_eq!(Error::from(failure).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_session_codes_stay_distinct() {
        assert_eq!(Error::from(SessionError::NoToken).code(), ErrorCode::NoToken);
        assert_eq!(
            Error::from(SessionError::InvalidToken(TokenError::BadSignature)).code(),
            ErrorCode::InvalidToken
        );
        assert_eq!(Error::from(SessionError::UserNotFound).code(), ErrorCode::UserNotFound);
        assert_eq!(
            Error::from(SessionError::AccountLocked { remaining_ms: 1 }).code(),
            ErrorCode::AccountLocked
        );
    }

    #[test]
    fn test_wrong_password_body() {
        let body = Error::InvalidCredentials { remaining_attempts: Some(2) }.body();
        assert_eq!(body.error, ErrorCode::InvalidCredentials);
        assert_eq!(body.message, "Invalid email or password. Remaining attempts: 2");
        assert_eq!(body.remaining_attempts, Some(2));
    }

    #[test]
    fn test_unknown_email_body_is_generic() {
        let body = Error::InvalidCredentials { remaining_attempts: None }.body();
        assert_eq!(body.message, "Invalid email or password");
        assert_eq!(body.remaining_attempts, None);
    }

    #[test]
    fn test_lock_messages() {
        let body = Error::AccountLocked {
            remaining_ms: 899_500,
            locked_for: Some(chrono::Duration::minutes(15)),
        }
        .body();
        assert_eq!(
            body.message,
            "Account locked for 15 minutes due to multiple failed attempts. Try again in 14:59"
        );
        assert_eq!(body.remaining_time, Some(899_500));

        let body = Error::AccountLocked { remaining_ms: 61_000, locked_for: None }.body();
        assert_eq!(body.message, "Account locked. Try again in 1:01");
    }

    #[test]
    fn test_short_lock_message_wording() {
        let body = Error::AccountLocked {
            remaining_ms: 59_000,
            locked_for: Some(chrono::Duration::seconds(60)),
        }
        .body();
        assert_eq!(
            body.message,
            "Account locked for 1 minute due to multiple failed attempts. Try again in 0:59"
        );

        let body = Error::AccountLocked {
            remaining_ms: 29_000,
            locked_for: Some(chrono::Duration::seconds(30)),
        }
        .body();
        assert_eq!(
            body.message,
            "Account locked for 30 seconds due to multiple failed attempts. Try again in 0:29"
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let body = Error::Internal("database password is hunter2".into()).body();
        assert_eq!(body.error, ErrorCode::InternalError);
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn test_store_error_is_internal() {
        let err = Error::from(StoreError::Unavailable("down".into()));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
