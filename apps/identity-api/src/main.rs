//! idfuse Identity API
//!
//! HTTP service exposing the unified identity engine: merging accounts and
//! binding, unbinding, and listing authentication methods.

mod config;
mod middleware;

use axum::{middleware::from_fn_with_state, Router};
use config::Config;
use idfuse_api_identity::{identity_router, IdentityConfig, IdentityState, JwtTokenVerifier};
use idfuse_db::{run_migrations, DbPool};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let pool = match DbPool::connect_with_options(&config.database_url, config.max_db_connections)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let state = IdentityState::new(IdentityConfig {
        pool: pool.inner().clone(),
        token_verifier: JwtTokenVerifier::shared(config.jwt_secret.as_bytes().to_vec()),
    });

    let app = Router::new()
        .merge(identity_router())
        .layer(from_fn_with_state(state.clone(), middleware::jwt_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: failed to bind {}: {e}", config.bind_addr);
            std::process::exit(1);
        }
    };

    info!("identity-api listening on {}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Error: server exited: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
