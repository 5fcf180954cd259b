//! HTTP server for the Prometheus metrics endpoint.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::registry::SharedRegistry;

const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const HEALTH_PATH: &str = "/health";

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Metrics path must start with / and contain no ':' or '*': {0:?}")]
    InvalidPath(String),
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    registry: SharedRegistry,
}

/// Create the HTTP router.
fn create_router(registry: SharedRegistry, metrics_path: &str) -> Router {
    let state = AppState { registry };

    let mut router = Router::new().route(metrics_path, get(metrics_handler));
    if metrics_path != HEALTH_PATH {
        router = router.route(HEALTH_PATH, get(health_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Handler for the metrics endpoint.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.registry.render() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", METRICS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to encode metrics\n",
            )
                .into_response()
        }
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// Check that the metrics path is a literal route.
///
/// The router reads `:` and `*` as capture syntax, so neither may appear.
pub fn validate_metrics_path(path: &str) -> Result<(), ServerError> {
    if !path.starts_with('/') || path.contains([':', '*']) {
        return Err(ServerError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Expand a `:port` address to listen on all IPv4 interfaces.
pub fn normalize_listen_address(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

/// HTTP server that has not bound its listener yet.
pub struct HttpServer {
    registry: SharedRegistry,
    listen_addr: String,
    metrics_path: String,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(
        registry: SharedRegistry,
        listen_addr: impl Into<String>,
        metrics_path: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            listen_addr: listen_addr.into(),
            metrics_path: metrics_path.into(),
        }
    }

    /// Bind the listener. Nothing is served until [`BoundServer::serve`] runs.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        validate_metrics_path(&self.metrics_path)?;

        let addr = normalize_listen_address(&self.listen_addr);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.listen_addr.clone(),
                source,
            })?;

        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: self.listen_addr.clone(),
            source,
        })?;

        info!(
            addr = %local_addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        Ok(BoundServer {
            router: create_router(self.registry, &self.metrics_path),
            listener,
            local_addr,
        })
    }

    /// Bind and serve until the process exits.
    pub async fn run(self) -> Result<(), ServerError> {
        self.bind().await?.serve().await
    }
}

/// HTTP server with a bound listener.
pub struct BoundServer {
    router: Router,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundServer {
    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests. Only returns if the accept loop fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        axum::serve(self.listener, self.router)
            .await
            .map_err(ServerError::Serve)
    }
}
