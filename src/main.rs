//! bioskop-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bioskop_gateway::api;
use bioskop_gateway::app_state::AppState;
use bioskop_gateway::config::StorefrontConfig;
use bioskop_gateway::domain::{EventBus, SessionRegistry};
use bioskop_gateway::persistence::postgres::PostgresStore;
use bioskop_gateway::service::{AccountService, IpLookup, MeteringService};
use bioskop_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = StorefrontConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting bioskop-gateway");

    // Connect to PostgreSQL and run migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PostgresStore::new(pool));

    // Build domain layer
    let registry = Arc::new(SessionRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let metering = Arc::new(MeteringService::new(
        registry,
        event_bus.clone(),
        Arc::clone(&store) as _,
        Arc::clone(&store) as _,
        Arc::clone(&store) as _,
        Duration::from_secs(config.debit_timeout_secs),
    ));

    let ip_lookup = IpLookup::new(
        config.ip_lookup_endpoints.clone(),
        Duration::from_secs(config.ip_lookup_timeout_secs),
    )?;
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&store) as _,
        Arc::clone(&store) as _,
        Arc::clone(&store) as _,
        ip_lookup,
        config.admin_access_code.clone(),
    ));

    // Build application state
    let app_state = AppState {
        metering,
        accounts,
        catalog: store,
        event_bus,
        rate_per_second: config.rate_per_second,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
