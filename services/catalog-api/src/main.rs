//! Catalog API service.
//!
//! HTTP front door for the GeoTIFF catalog:
//! - `POST /upload-geotiff` - accept a raster upload and run the pipeline
//! - `GET /api/datasets` - the catalog grouped by category
//! - `GET /health` - health check

mod handlers;
mod state;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ingestion::IngestConfig;
use state::AppState;

/// Uploads above this size are rejected outright.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "catalog-api")]
#[command(about = "GeoTIFF catalog API server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Run catalog migrations before serving
    #[arg(long)]
    migrate: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting catalog API server");

    // Configuration is read once here and passed down by reference
    let config = IngestConfig::from_env()?;
    let state = Arc::new(AppState::new(&config, args.migrate).await?);

    // Build router
    let app = Router::new()
        .route("/upload-geotiff", post(handlers::upload_geotiff_handler))
        .route("/api/datasets", get(handlers::datasets_handler))
        .route("/health", get(handlers::health_handler))
        .layer(Extension(state))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    // Parse listen address
    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
