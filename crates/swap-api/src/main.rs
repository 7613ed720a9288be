//! JSON HTTP API for SkillSwap.
//!
//! Serves profiles, matching, messaging, study groups and credits over
//! a SQLite database. Callers identify themselves with the `x-user-id`
//! header set by the identity proxy in front of this server.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use swap_core::{ServiceSettings, SkillSwap};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swap_api=info,database=info,swap_core=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting SkillSwap API server");

    // Connect to database
    let db = Database::connect_with_pool_size(&config.database_url, config.pool_size).await?;
    db.migrate().await?;

    // Build application state
    let settings = ServiceSettings {
        typing_ttl: config.typing_ttl,
    };
    let service = SkillSwap::with_settings(Arc::new(db), settings);
    let state = AppState::new(service);

    // Build router
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "SkillSwap API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
