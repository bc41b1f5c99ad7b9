//! ProjectDesk server

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pd_api::AppState;
use pd_core::config::{AppConfig, StoreBackend};
use pd_db::{Database, DatabaseConfig, EntityStore, MemoryStore, PgStore};

mod health;

use health::{HealthChecker, HealthConfig, HealthState};

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("JWT_SECRET is not set, using the built-in development secret");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        backend = ?config.database.backend,
        "Starting ProjectDesk"
    );

    let (store, db) = open_store(&config).await?;
    let app = build_router(store, &config);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,pd_server=debug,pd_api=debug,pd_services=debug,tower_http=debug".into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_target(true)))
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
        }))
        .init();
}

async fn open_store(config: &AppConfig) -> anyhow::Result<(Arc<dyn EntityStore>, Option<Database>)> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on shutdown");
            Ok((Arc::new(MemoryStore::new()), None))
        }
        StoreBackend::Postgres => {
            let db = Database::connect(&DatabaseConfig::from_app(&config.database))
                .await
                .context("failed to connect to database")?;
            info!("Connected to database");
            let store = PgStore::new(db.pool().clone());
            Ok((Arc::new(store), Some(db)))
        }
    }
}

/// Build the application router
fn build_router(store: Arc<dyn EntityStore>, config: &AppConfig) -> Router {
    let health = Arc::new(HealthState {
        health: HealthChecker::new(
            HealthConfig::default(),
            store.clone(),
            config.database.backend,
        ),
    });

    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    let api_routes = pd_api::router().with_state(AppState::new(store, &config.auth));

    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut config = AppConfig::default();
        config.database.backend = StoreBackend::Memory;
        build_router(Arc::new(MemoryStore::new()), &config)
    }

    async fn get(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        assert_eq!(get(test_app(), "/health").await, StatusCode::OK);
        assert_eq!(get(test_app(), "/health/live").await, StatusCode::OK);
        assert_eq!(get(test_app(), "/health/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_report_names_backend() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report["status"], "healthy");
        assert_eq!(report["components"][0]["name"], "memory");
    }

    #[tokio::test]
    async fn test_api_is_mounted() {
        assert_eq!(get(test_app(), "/api").await, StatusCode::OK);
        assert_eq!(get(test_app(), "/api/projects").await, StatusCode::UNAUTHORIZED);
        assert_eq!(get(test_app(), "/nope").await, StatusCode::NOT_FOUND);
    }
}
