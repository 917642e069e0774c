//! Configuration for the authentication service.

use std::path::Path;

use config::{Config as ConfigLoader, Environment, File, Source};
use serde::Deserialize;

use crate::auth::lockout::{
    LockoutPolicy, DEFAULT_LOCK_DURATION_SECS, DEFAULT_MAX_ATTEMPTS, MAX_LOCK_DURATION_SECS,
};
use crate::auth::password::{self, DEFAULT_BCRYPT_COST, MAX_PASSWORD_BYTES};
use crate::auth::token::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};
use crate::models::User;

/// Demo account seeded when no users are configured.
pub const DEMO_USER_ID: &str = "1";
pub const DEMO_USER_EMAIL: &str = "user@example.com";
pub const DEMO_USER_NAME: &str = "Test User";
pub const DEMO_USER_PASSWORD: &str = "password";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("token.secret must be set (e.g. LOGIN__TOKEN__SECRET)")]
    MissingSecret,
    #[error("Invalid setting {0}: {1}")]
    Invalid(&'static str, String),
    #[error("Seed user {0} needs either password or password_hash")]
    MissingCredential(String),
    #[error("Seed user email {0} is listed more than once")]
    DuplicateEmail(String),
    #[error("Seed user {0} has a password longer than bcrypt's 72-byte limit")]
    PasswordTooLong(String),
    #[error("Failed to hash seed password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub token: TokenConfig,
    #[serde(default)]
    pub lockout: LockoutConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Accounts created at startup. Empty means "seed the demo account".
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins, comma-separated. `*` allows any origin.
    #[serde(default = "default_cors_origin")]
    pub origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: default_cors_origin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// HMAC signing secret. No default.
    pub secret: String,
    #[serde(default = "default_token_ttl")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_lock_duration")]
    pub duration_secs: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            duration_secs: default_lock_duration(),
        }
    }
}

impl LockoutConfig {
    /// Lockout policy for these settings. Durations past the accepted maximum
    /// are clamped to it; [`Config::validate`] rejects them outright.
    pub fn policy(&self) -> LockoutPolicy {
        let secs = self.duration_secs.min(MAX_LOCK_DURATION_SECS);
        LockoutPolicy::new(self.max_attempts, chrono::Duration::seconds(secs as i64))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    /// bcrypt cost used when hashing plaintext seed passwords.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// An account to create at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    /// Plaintext, hashed at startup.
    #[serde(default)]
    pub password: Option<String>,
    /// Pre-computed bcrypt hash; wins over `password`.
    #[serde(default)]
    pub password_hash: Option<String>,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_cors_origin() -> String {
    "http://localhost:4000".to_string()
}
fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_lock_duration() -> u64 {
    DEFAULT_LOCK_DURATION_SECS
}
fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (LOGIN__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(File::with_name("config").required(false))
    }

    /// Like [`Config::load`], reading the given file instead of `config.toml`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(File::from(path))
    }

    fn load_with<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let loader = ConfigLoader::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("LOGIN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = loader.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break the lockout or token invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.token.ttl_secs == 0 {
            return Err(ConfigError::Invalid("token.ttl_secs", "must be positive".into()));
        }
        if self.token.ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid(
                "token.ttl_secs",
                format!("{} exceeds the maximum of {}", self.token.ttl_secs, MAX_TOKEN_TTL_SECS),
            ));
        }
        if self.lockout.max_attempts == 0 {
            return Err(ConfigError::Invalid("lockout.max_attempts", "must be at least 1".into()));
        }
        if self.lockout.duration_secs == 0 {
            return Err(ConfigError::Invalid("lockout.duration_secs", "must be positive".into()));
        }
        if self.lockout.duration_secs > MAX_LOCK_DURATION_SECS {
            return Err(ConfigError::Invalid(
                "lockout.duration_secs",
                format!(
                    "{} exceeds the maximum of {}",
                    self.lockout.duration_secs, MAX_LOCK_DURATION_SECS
                ),
            ));
        }
        if !(4..=31).contains(&self.password.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "password.bcrypt_cost",
                format!("{} is outside 4..=31", self.password.bcrypt_cost),
            ));
        }
        Ok(())
    }

    /// Token lifetime as a chrono duration, clamped like [`LockoutConfig::policy`].
    pub fn token_ttl(&self) -> chrono::Duration {
        let secs = self.token.ttl_secs.min(MAX_TOKEN_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    /// Build the user records to seed the store with, hashing plaintext
    /// passwords.
    pub fn seed_users(&self) -> Result<Vec<User>, ConfigError> {
        let cost = self.password.bcrypt_cost;

        if self.users.is_empty() {
            let hash = password::hash_password(DEMO_USER_PASSWORD, cost)?;
            return Ok(vec![User::new(
                DEMO_USER_ID,
                DEMO_USER_EMAIL,
                DEMO_USER_NAME,
                hash,
            )]);
        }

        let mut users: Vec<User> = Vec::with_capacity(self.users.len());
        for seed in &self.users {
            if users.iter().any(|u| u.email == seed.email) {
                return Err(ConfigError::DuplicateEmail(seed.email.clone()));
            }

            let hash = match (&seed.password_hash, &seed.password) {
                (Some(hash), _) => hash.clone(),
                (None, Some(plain)) if plain.len() > MAX_PASSWORD_BYTES => {
                    return Err(ConfigError::PasswordTooLong(seed.email.clone()));
                }
                (None, Some(plain)) => password::hash_password(plain, cost)?,
                (None, None) => return Err(ConfigError::MissingCredential(seed.email.clone())),
            };

            let id = seed
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            users.push(User::new(id, seed.email.clone(), seed.name.clone(), hash));
        }

        Ok(users)
    }
}
