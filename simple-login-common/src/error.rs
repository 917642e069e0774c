//! Error codes and the error body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

/// Machine-readable failure category.
///
/// Serialized in `SCREAMING_SNAKE_CASE`, e.g. `"ACCOUNT_LOCKED"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or malformed input.
    ValidationError,
    /// Unknown email or wrong password. The two are indistinguishable on purpose.
    InvalidCredentials,
    /// Too many failed attempts; the account is temporarily locked.
    AccountLocked,
    /// No account for the given email or token subject.
    UserNotFound,
    /// No bearer token was presented.
    NoToken,
    /// Bearer token is malformed, badly signed or expired.
    InvalidToken,
    /// Unexpected server fault.
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::AccountLocked => "ACCOUNT_LOCKED",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::NoToken => "NO_TOKEN",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every non-2xx response from the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    pub error: ErrorCode,
    pub message: String,
    /// Failed attempts left before the account locks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
    /// Milliseconds until a locked account unlocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error,
            message: message.into(),
            remaining_attempts: None,
            remaining_time: None,
        }
    }

    pub fn with_remaining_attempts(mut self, attempts: u32) -> Self {
        self.remaining_attempts = Some(attempts);
        self
    }

    pub fn with_remaining_time(mut self, millis: u64) -> Self {
        self.remaining_time = Some(millis);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_format() {
        let json = serde_json::to_string(&ErrorCode::AccountLocked).unwrap();
        assert_eq!(json, "\"ACCOUNT_LOCKED\"");

        let parsed: ErrorCode = serde_json::from_str("\"NO_TOKEN\"").unwrap();
        assert_eq!(parsed, ErrorCode::NoToken);
    }

    #[test]
    fn test_error_code_display_matches_serde() {
        let codes = [
            ErrorCode::ValidationError,
            ErrorCode::InvalidCredentials,
            ErrorCode::AccountLocked,
            ErrorCode::UserNotFound,
            ErrorCode::NoToken,
            ErrorCode::InvalidToken,
            ErrorCode::InternalError,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json.trim_matches('"'), code.to_string());
        }
    }

    #[test]
    fn test_error_response_omits_absent_counters() {
        let body = ErrorResponse::new(ErrorCode::InvalidCredentials, "Invalid email or password");
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "INVALID_CREDENTIALS");
        assert!(value.get("remainingAttempts").is_none());
        assert!(value.get("remainingTime").is_none());
    }

    #[test]
    fn test_error_response_camel_case_counters() {
        let body = ErrorResponse::new(ErrorCode::AccountLocked, "locked")
            .with_remaining_time(899_000);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["remainingTime"], 899_000);

        let body = ErrorResponse::new(ErrorCode::InvalidCredentials, "wrong")
            .with_remaining_attempts(2);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["remainingAttempts"], 2);
    }
}
