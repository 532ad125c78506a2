//! Church Portal API server

use std::sync::Arc;

use axum::Router;
use http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use church_portal::adapters::{
    dashboard_routes, DashboardAppState, InMemorySnapshotCache, PostgresRecordStore,
};
use church_portal::config::{AppConfig, ServerConfig};
use church_portal::ports::SystemClock;

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(
    server: &ServerConfig,
) -> Result<Option<CorsLayer>, http::header::InvalidHeaderValue> {
    let origins = server.cors_origins_list();
    if origins.is_empty() {
        return Ok(None);
    }
    let origins = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET]),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    tracing::info!("Connecting to {}", config.database.redacted_url());
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    let mut state = DashboardAppState::new(
        Arc::new(PostgresRecordStore::new(pool)),
        Arc::new(SystemClock),
    )
    .with_limits(
        config.aggregation.list_row_cap,
        config.aggregation.trend_bucket_cap,
    );
    if let Some(ttl) = config.aggregation.cache_ttl() {
        let capacity = config.aggregation.cache_max_entries;
        tracing::info!(?ttl, capacity, "Dashboard snapshot cache enabled");
        state = state.with_snapshot_cache(Arc::new(InMemorySnapshotCache::new(ttl, capacity)));
    }

    let mut app: Router = dashboard_routes(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(&config.server)? {
        app = app.layer(cors);
    }

    let addr = config.server.socket_addr()?;
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
