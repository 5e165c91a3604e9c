//! AP Monitor - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ap_monitor_backend::{api, config::Config, db, error::Result, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Held until shutdown so pending spans are flushed
    let _otel_guard = telemetry::init_tracing(&config)?;
    tracing::info!("Starting AP Monitor");

    // Connect to database
    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    // Run migrations
    db::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    tracing::info!(
        radius_km = config.cluster_radius_km,
        per_page = config.access_points_per_page,
        "Map and listing settings"
    );

    let addr: SocketAddr = config.bind_address.parse()?;
    let state = Arc::new(api::AppState::new(config, db_pool)?);

    // Build router
    let app = Router::new()
        .merge(api::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
