//! Atelier Server - Appliance Repair Shop Management System
//!
//! A Rust REST API server for managing a repair shop: clients, repair
//! interventions, loaner devices and the spare-parts stock.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("atelier_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Atelier Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config.documents)
        .expect("Failed to create services");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Clients
        .route("/clients", get(api::clients::list_clients))
        .route("/clients", post(api::clients::create_client))
        .route("/clients/:id", get(api::clients::get_client))
        .route("/clients/:id", put(api::clients::update_client))
        .route("/clients/:id", delete(api::clients::delete_client))
        // Client devices
        .route("/clients/:id/devices", get(api::clients::list_devices))
        .route("/clients/:id/devices", post(api::clients::create_device))
        .route("/clients/:id/devices/:device_id", put(api::clients::update_device))
        .route("/clients/:id/devices/:device_id", delete(api::clients::delete_device))
        // Interventions
        .route("/interventions", get(api::interventions::list_interventions))
        .route("/interventions", post(api::interventions::create_intervention))
        .route("/interventions/:id", get(api::interventions::get_intervention))
        .route("/interventions/:id", put(api::interventions::update_intervention))
        .route("/interventions/:id", delete(api::interventions::delete_intervention))
        .route("/interventions/:id/parts", post(api::interventions::record_part_usage))
        .route("/interventions/:id/deposit", post(api::interventions::commit_deposit))
        // Loaner devices
        .route("/loaner-devices", get(api::loaners::list_loaners))
        .route("/loaner-devices", post(api::loaners::create_loaner))
        .route("/loaner-devices/available", get(api::loaners::list_available_loaners))
        .route("/loaner-devices/:id", get(api::loaners::get_loaner))
        .route("/loaner-devices/:id", put(api::loaners::update_loaner))
        .route("/loaner-devices/:id", delete(api::loaners::delete_loaner))
        .route("/loaner-devices/:id/loans", get(api::loaners::list_loaner_loans))
        // Loans
        .route("/loans", get(api::loans::list_loans))
        .route("/loans", post(api::loans::create_loan))
        .route("/loans/:id/return", post(api::loans::return_loan))
        // Parts
        .route("/parts", get(api::parts::list_parts))
        .route("/parts", post(api::parts::create_part))
        .route("/parts/alerts", get(api::parts::list_alerts))
        .route("/parts/:id", get(api::parts::get_part))
        .route("/parts/:id", put(api::parts::update_part))
        .route("/parts/:id", delete(api::parts::delete_part))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
