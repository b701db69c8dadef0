//! Tomato Ripeness Management Service - Backend Server
//!
//! Accepts uploaded tomato images, delegates detection to an external model
//! service, aggregates ripeness stages, recommends environmental setpoints,
//! and keeps growth records for harvest estimation.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::ClassCatalog;

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use external::{Detector, HttpDetectorClient};
use services::ImageStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub detector: Arc<dyn Detector>,
    pub catalog: Arc<ClassCatalog>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trm_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Tomato Ripeness Management Server");
    tracing::info!("Environment: {}", config.environment);

    shared::validate_confidence_threshold(config.detector.confidence_threshold)
        .map_err(|e| anyhow::anyhow!("detector.confidence_threshold: {}", e))?;
    shared::validate_class_names(&config.detector.class_names)
        .map_err(|e| anyhow::anyhow!("detector.class_names: {}", e))?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // The predictions directory must exist before the first upload lands
    let image_store = ImageStore::new(&config.storage.predictions_dir);
    image_store.ensure_root().await?;

    let catalog = ClassCatalog::from_class_names(&config.detector.class_names);
    tracing::info!("Class catalog loaded with {} labels", catalog.len());

    let detector = HttpDetectorClient::new(
        config.detector.endpoint.clone(),
        config.detector.api_key.clone(),
    );

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        detector: Arc::new(detector),
        catalog: Arc::new(catalog),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_upload_bytes = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Tomato Ripeness Management API v1.0"
}
