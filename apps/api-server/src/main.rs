//! # Blog API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use blog_core::ports::TokenService;
use blog_infra::{InMemoryDatabase, JwtTokenService, memory_stores};

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Starting Blog API Server");

    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
    let adapters = state::Adapters::from_env();

    run(&config, adapters, tokens).await
}

/// PostgreSQL when configured and reachable, otherwise the in-memory store.
#[cfg(feature = "postgres")]
async fn run(
    config: &AppConfig,
    parts: state::Adapters,
    tokens: Arc<dyn TokenService>,
) -> std::io::Result<()> {
    match &config.database {
        Some(db_config) => match blog_infra::connect(db_config).await {
            Ok(db) => {
                let state = parts.with_stores(blog_infra::postgres_stores(db));
                return serve(config, state, tokens).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }
    }
    let state = parts.with_stores(memory_stores(&InMemoryDatabase::new()));
    serve(config, state, tokens).await
}

#[cfg(not(feature = "postgres"))]
async fn run(
    config: &AppConfig,
    parts: state::Adapters,
    tokens: Arc<dyn TokenService>,
) -> std::io::Result<()> {
    tracing::info!("Running without postgres feature - using in-memory store");
    let state = parts.with_stores(memory_stores(&InMemoryDatabase::new()));
    serve(config, state, tokens).await
}

async fn serve<Tx: Send + Sync + 'static>(
    config: &AppConfig,
    state: AppState<Tx>,
    tokens: Arc<dyn TokenService>,
) -> std::io::Result<()> {
    tracing::info!("Application state initialized");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(handlers::configure_routes::<Tx>)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
