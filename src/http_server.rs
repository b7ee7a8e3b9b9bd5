use axum::{middleware, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    db_persistence::DbPersistence,
    metrics::{metrics_handler, track_metrics, Metrics},
    routes::api_routes,
    services::referral_redeemer::{RedemptionPolicy, ReferralRedeemer},
};

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("Failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type HttpServerResult<T> = Result<T, HttpServerError>;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Arc<DbPersistence>,
    pub redeemer: Arc<ReferralRedeemer>,
    pub metrics: Arc<Metrics>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Arc<DbPersistence>, config: Arc<Config>) -> Self {
        let redeemer = ReferralRedeemer::new(&db.pool, RedemptionPolicy::from(&config.referral));

        Self {
            db,
            redeemer: Arc::new(redeemer),
            metrics: Arc::new(Metrics::new()),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// Create the HTTP server router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api_routes())
        .layer(middleware::from_fn(track_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        service: "localoco".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn start_server(state: AppState, bind_address: &str) -> HttpServerResult<()> {
    let app = create_router(state);

    tracing::info!("Starting HTTP server on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| HttpServerError::Bind(bind_address.to_string(), e))?;
    axum::serve(listener, app).await?;

    Ok(())
}
