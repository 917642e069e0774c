//! SimpleLogin server binary.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;

use simple_login_backend::auth::lockout::describe_lock_duration;
use simple_login_backend::{app, logging, AppState, Config};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("simple-login {}", VERSION);
        return Ok(());
    }

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml exists or set LOGIN__TOKEN__SECRET.",
            e
        )
    })?;

    logging::init(&config.logging.level);
    tracing::info!("Starting SimpleLogin {}", VERSION);

    let state = Arc::new(AppState::from_config(config.clone()).await?);
    let policy = state.issuer.policy();
    tracing::info!(
        "Lockout after {} failed attempts for {}",
        policy.max_attempts,
        describe_lock_duration(policy.lock_duration)
    );
    tracing::info!("Session tokens valid for {}s", config.token.ttl_secs);

    let app = app(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
