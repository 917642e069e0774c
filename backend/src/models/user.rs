use chrono::{DateTime, Utc};
use simple_login_common::UserProfile;

/// Account record with credentials and lockout state.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier, embedded in session tokens as `sub`
    pub id: String,
    /// Unique, case-sensitive login key
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Display name
    pub name: String,
    /// Consecutive failed logins since the last success or unlock
    pub login_attempts: u32,
    /// Set while the account is locked
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create an unlocked account with no failed attempts.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
        }
    }

    /// Public view returned to callers.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}
