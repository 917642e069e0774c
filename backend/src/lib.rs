//! SimpleLogin - email/password authentication with progressive account lockout.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod store;
pub mod test_util;

pub use crate::auth::{LockoutPolicy, Session, SessionIssuer, TokenSigner};
pub use crate::config::{Config, ConfigError};
pub use crate::error::{Error, Result, SessionError};
pub use crate::models::User;
pub use crate::store::{InMemoryUserRepository, StoreError, UserRepository};

use std::sync::Arc;

use axum::http::header::{self, HeaderValue};
use axum::http::Method;
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub issuer: SessionIssuer,
}

impl AppState {
    /// Seed the in-memory store from `config` and wire up the issuer.
    pub async fn from_config(config: Config) -> std::result::Result<Self, ConfigError> {
        let users = config.seed_users()?;
        let count = users.len();
        let repository = InMemoryUserRepository::with_users(users)
            .await
            .map_err(|e| ConfigError::Invalid("users", e.to_string()))?;
        tracing::info!("Seeded {} user(s)", count);

        let signer = TokenSigner::new(config.token.secret.as_bytes(), config.token_ttl());
        let issuer = SessionIssuer::new(
            Arc::new(repository),
            signer,
            config.lockout.policy(),
            config.password.bcrypt_cost,
        );

        Ok(Self { config, issuer })
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    if origin.trim() == "*" {
        return layer.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .filter_map(|o| {
            match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors.origin);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/auth", routes::auth::router())
        .fallback(routes::not_found)
        .layer(middleware::from_fn(logging::request_logger))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
