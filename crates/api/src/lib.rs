//! teamcal API Server Library

pub mod config;
pub mod error;
mod routes;

use std::sync::Arc;

use axum::Router;
use teamcal_core::config::CoreConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigin;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CoreConfig>,
}

impl AppState {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState, cors_origin: &CorsOrigin) -> Router {
    let cors = match cors_origin {
        CorsOrigin::Any => CorsLayer::new().allow_origin(Any),
        CorsOrigin::Exact(origin) => CorsLayer::new().allow_origin(origin.clone()),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .nest("/api", routes::calendar::routes())
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let user_agent = request
                        .headers()
                        .get(axum::http::header::USER_AGENT)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                        user_agent = %user_agent,
                    )
                })
                .on_request(|_request: &axum::http::Request<_>, _span: &tracing::Span| {
                    tracing::info!("started processing request");
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %response.status(),
                            "finished processing request"
                        );
                    },
                ),
        )
        .with_state(state)
}

/// Run the API server
///
/// Serves until SIGINT or SIGTERM, then drains in-flight requests.
pub async fn run_api(config: &config::Config) -> Result<(), std::io::Error> {
    let state = AppState::new(config.core.clone());
    let app = create_router(state, &config.cors_allowed_origin);
    let addr = config.addr();

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
