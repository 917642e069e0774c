//! Helpers shared by unit and integration tests.

use std::sync::Arc;

use crate::auth::password;
use crate::auth::{LockoutPolicy, SessionIssuer, TokenSigner};
use crate::config::{
    Config, CorsConfig, LockoutConfig, LoggingConfig, PasswordConfig, ServerConfig, TokenConfig,
};
use crate::models::User;
use crate::store::{InMemoryUserRepository, UserRepository};
use crate::AppState;

pub const TEST_SECRET: &str = "test-secret-not-for-production";
pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_PASSWORD: &str = "password";
/// bcrypt's minimum cost, so tests don't spend seconds hashing.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        cors: CorsConfig {
            origin: "http://localhost:4000".to_string(),
        },
        token: TokenConfig {
            secret: TEST_SECRET.to_string(),
            ttl_secs: 24 * 60 * 60,
        },
        lockout: LockoutConfig {
            max_attempts: 3,
            duration_secs: 15 * 60,
        },
        password: PasswordConfig {
            bcrypt_cost: TEST_BCRYPT_COST,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        users: vec![],
    }
}

/// Build an unlocked user whose password hash matches `password`.
pub fn test_user(id: &str, email: &str, name: &str, password: &str) -> User {
    let hash = password::hash_password(password, TEST_BCRYPT_COST).expect("Failed to hash password");
    User::new(id, email, name, hash)
}

/// Store holding the demo user (id "1") and an admin user (id "2").
pub async fn test_repository() -> Arc<InMemoryUserRepository> {
    let users = vec![
        test_user("1", TEST_EMAIL, "Test User", TEST_PASSWORD),
        test_user("2", "admin@example.com", "Admin", "admin-password"),
    ];
    Arc::new(
        InMemoryUserRepository::with_users(users)
            .await
            .expect("Failed to seed repository"),
    )
}

pub fn test_signer() -> TokenSigner {
    TokenSigner::new(TEST_SECRET.as_bytes(), test_config().token_ttl())
}

pub fn test_issuer(users: Arc<dyn UserRepository>) -> SessionIssuer {
    SessionIssuer::new(users, test_signer(), LockoutPolicy::default(), TEST_BCRYPT_COST)
}

/// Application state seeded from [`test_config`], i.e. with only the demo user.
pub async fn create_test_state() -> Arc<AppState> {
    Arc::new(
        AppState::from_config(test_config())
            .await
            .expect("Failed to build test state"),
    )
}
