//! Request and response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};

/// Public view of an account. Never carries credentials or lockout state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// POST /api/auth/login body.
///
/// Both fields are optional at the wire level so that a missing field is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/auth/remember-password body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// Signed bearer token.
    pub token: String,
    pub user: UserProfile,
}

/// Successful recovery request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

/// Successful token verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}
