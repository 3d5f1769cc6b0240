//! Application startup and lifecycle management.

use crate::config::{AssistantConfig, CorsConfig};
use crate::handlers;
use crate::services::{build_generator, init_metrics, Assistant, HistoryStore};
use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, RequestId};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Assistant,
}

impl AppState {
    /// Connect persistence and build the configured generator.
    pub async fn from_config(config: &AssistantConfig) -> Result<Self, AppError> {
        let history = HistoryStore::connect(&config.mongodb).await;
        let generator = build_generator(&config.generator)?;

        Ok(Self {
            assistant: Assistant::new(generator, history),
        })
    }
}

/// Allowed origins get every method and header (mirrored from the preflight,
/// since wildcards are not permitted together with credentials).
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/history", get(handlers::history))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    request_id = %span_request_id(request),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer(cors))
}

/// Id set by `request_id_middleware`, or `-` outside it.
fn span_request_id<B>(request: &axum::http::Request<B>) -> &str {
    request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.as_str())
        .unwrap_or("-")
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Persistence problems never fail this; configuration and bind errors do.
    pub async fn build(config: AssistantConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config).await?;
        Self::build_with_state(config, state).await
    }

    /// Build around a pre-assembled state (e.g. a mock generator in tests).
    pub async fn build_with_state(
        config: AssistantConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        init_metrics();

        let persistence = state.assistant.history_store().is_available();
        let router = build_router(state, &config.cors);

        // port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            persistence,
            "Assistant service listening"
        );

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_uses_request_id_extension() {
        let mut request = axum::http::Request::builder()
            .uri("/ask")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(RequestId("req-7".to_string()));

        assert_eq!(span_request_id(&request), "req-7");
    }

    #[test]
    fn span_falls_back_without_extension() {
        let request = axum::http::Request::builder().uri("/ask").body(()).unwrap();
        assert_eq!(span_request_id(&request), "-");
    }
}
