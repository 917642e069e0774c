//! Lockout-aware session issuer.
//!
//! Orchestrates credential checks, attempt counting and token issuance.
//! Every read-modify-write of an account's lockout fields happens while
//! holding that account's guard from the repository, so concurrent logins
//! against one account are applied one at a time.

use std::sync::Arc;

use chrono::Utc;
use simple_login_common::UserProfile;
use tracing::{debug, info, warn};

use super::lockout::{self, FailureOutcome, LockState, LockoutPolicy};
use super::password;
use super::token::TokenSigner;
use crate::error::{Error, Result, SessionError};
use crate::store::UserRepository;

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Compared against when the email is unknown, so that path pays the same
/// bcrypt cost as a wrong password.
const DUMMY_PASSWORD: &str = "simple-login-dummy-password";

pub struct SessionIssuer {
    users: Arc<dyn UserRepository>,
    tokens: TokenSigner,
    policy: LockoutPolicy,
    dummy_hash: String,
}

impl SessionIssuer {
    /// `bcrypt_cost` should match the cost of the stored hashes.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: TokenSigner,
        policy: LockoutPolicy,
        bcrypt_cost: u32,
    ) -> Self {
        let dummy_hash = password::hash_password(DUMMY_PASSWORD, bcrypt_cost).unwrap_or_else(|e| {
            warn!("Failed to prepare dummy hash, unknown emails skip bcrypt: {}", e);
            String::new()
        });

        Self {
            users,
            tokens,
            policy,
            dummy_hash,
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Authenticate with email and password, issuing a token on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.is_empty() || password.is_empty() {
            return Err(Error::Validation("Email and password are required".to_string()));
        }

        // Unknown emails get the same answer, and roughly the same latency, as
        // wrong passwords.
        let Some(found) = self.users.find_by_email(email).await? else {
            self.check_password(password, &self.dummy_hash).await?;
            debug!("Login rejected: no such account");
            return Err(Error::InvalidCredentials {
                remaining_attempts: None,
            });
        };

        let _guard = self.users.lock_account(&found.id).await?;

        // Re-read under the guard to see writes from requests that held it before us.
        let Some(mut user) = self.users.find_by_id(&found.id).await? else {
            return Err(Error::InvalidCredentials {
                remaining_attempts: None,
            });
        };

        let now = Utc::now();
        if let LockState::Locked { until } = lockout::lock_state(&user, now) {
            info!(user_id = %user.id, "Login rejected: account locked");
            return Err(Error::AccountLocked {
                remaining_ms: lockout::remaining_millis(until, now),
                locked_for: None,
            });
        }

        if lockout::release_expired(&mut user, now) {
            info!(user_id = %user.id, "Lock expired, account unlocked");
        }

        let matches = self.check_password(password, &user.password_hash).await?;
        let now = Utc::now();

        if !matches {
            let outcome = self.policy.record_failure(&mut user, now);
            self.users.update(&user).await?;

            return match outcome {
                FailureOutcome::Retry { remaining_attempts } => {
                    warn!(
                        user_id = %user.id,
                        attempts = user.login_attempts,
                        remaining_attempts,
                        "Login failed: wrong password"
                    );
                    Err(Error::InvalidCredentials {
                        remaining_attempts: Some(remaining_attempts),
                    })
                }
                FailureOutcome::Locked { until } => {
                    warn!(
                        user_id = %user.id,
                        attempts = user.login_attempts,
                        locked_until = %until,
                        "Login failed: account locked after repeated failures"
                    );
                    Err(Error::AccountLocked {
                        remaining_ms: lockout::remaining_millis(until, Utc::now()),
                        locked_for: Some(self.policy.lock_duration),
                    })
                }
            };
        }

        lockout::record_success(&mut user);
        self.users.update(&user).await?;

        let token = self
            .tokens
            .issue(&user)
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!(user_id = %user.id, "Login succeeded");
        Ok(Session {
            token,
            user: user.profile(),
        })
    }

    /// Look up the account behind a password-recovery request.
    ///
    /// Does not touch lockout state. Unlike login, an unknown email is
    /// reported as such.
    pub async fn request_recovery(&self, email: &str) -> Result<UserProfile> {
        if email.is_empty() {
            return Err(Error::Validation("Email is required".to_string()));
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(Error::UserNotFound)?;

        info!(user_id = %user.id, "Password recovery requested");
        Ok(user.profile())
    }

    /// Validate a bearer token against the current state of its account.
    pub async fn verify_session(&self, token: &str) -> Result<UserProfile> {
        let claims = self.tokens.verify(token).map_err(|e| {
            debug!("Token rejected: {}", e);
            SessionError::InvalidToken(e)
        })?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(SessionError::UserNotFound)?;

        let now = Utc::now();
        if let LockState::Locked { until } = lockout::lock_state(&user, now) {
            debug!(user_id = %user.id, "Token rejected: account locked");
            return Err(SessionError::AccountLocked {
                remaining_ms: lockout::remaining_millis(until, now),
            }
            .into());
        }

        Ok(user.profile())
    }

    async fn check_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| Error::Internal(format!("password check task failed: {}", e)))
    }
}
