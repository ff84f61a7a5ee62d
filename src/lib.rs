use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::ai::AiService;
use crate::error::AppResult;
use crate::model::{DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::web::AppState;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod ai;
pub mod auth;
pub mod error;
pub mod model;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "skillforge";

/// Connects, migrates and assembles the router using the process configuration.
/// Debug builds read `./config.toml`, release builds the per-user config directory.
pub async fn build_server() -> AppResult<(AppState, Router)> {
    let config = Config::get_or_init(cfg!(debug_assertions)).await;

    let db = DbConnection::connect(config.app().database_uri())?;
    db.migrate().await?;

    compose(db, config).await
}

/// Same as [`build_server`] for a pool that is already migrated.
pub async fn build_server_with_pool(db: DbConnection) -> AppResult<(AppState, Router)> {
    compose(db, Config::get_or_init(true).await).await
}

async fn compose(db: DbConnection, config: &'static Config) -> AppResult<(AppState, Router)> {
    let mm = ModelManager::new(db);
    if config.app().seed_defaults() {
        model::seed::seed_default_accounts(&mm).await?;
    }

    let ai = AiService::from_config(config.ai())?;
    let state = AppState::new(mm, config, Arc::new(ai));
    let router = web::routes::build_app(state.clone());
    Ok((state, router))
}

#[tracing::instrument]
pub async fn serve() -> AppResult<()> {
    let (state, router) = build_server().await?;
    let bind_to = state.config().host().bindto();

    let listener = TcpListener::bind(bind_to).await?;
    tracing::info!("skillforge listening on {bind_to}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // RUST_LOG may come from .env
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")))
        .with(ErrorLayer::default())
        .init();
}

pub async fn run() -> AppResult<()> {
    init_tracing();
    serve().await
}
