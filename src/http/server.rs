//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (tracing, timeout,
//!   request ID)
//! - Funnel every request through the dispatch table
//! - Inject application state into requests for guards and handlers
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - The dispatch table is published (Arc) before the listener accepts;
//!   request tasks read it without synchronization
//! - Unmatched method/path answers the fixed 404 envelope
//! - Chain failures surface as `ApiError` and pass the error boundary

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::dispatch::{DispatchTable, Method};
use crate::http::error::not_found;
use crate::http::request::{request_id, request_id_middleware};
use crate::id::SnowflakeGenerator;
use crate::principal::PrincipalStore;
use crate::routes::test::TestState;
use crate::token::TokenCodec;

/// Application state injected into handlers and guards.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<DispatchTable>,
    pub store: Arc<dyn PrincipalStore>,
    pub tokens: TokenCodec,
    pub ids: Arc<SnowflakeGenerator>,
    pub test_state: Arc<TestState>,
    pub guard_timeout: Duration,
}

/// HTTP server for the scaffold.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over a published dispatch table.
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main dispatch handler: table lookup, then the route's guard chain.
async fn dispatch_handler(State(state): State<AppState>, mut req: Request<Body>) -> Response {
    let path = req.uri().path().to_string();
    let request_id = request_id(&req).to_string();

    let Some(method) = Method::from_http(req.method()) else {
        tracing::debug!(request_id = %request_id, method = %req.method(), path = %path, "unsupported method");
        return not_found();
    };

    let Some(route) = state.table.lookup(method, &path) else {
        tracing::debug!(request_id = %request_id, method = method.as_str(), path = %path, "no route matched");
        return not_found();
    };

    tracing::debug!(
        request_id = %request_id,
        method = method.as_str(),
        path = %path,
        "dispatching request"
    );

    // Guards and handlers read shared state from request extensions.
    let chain = route.chain(state.guard_timeout);
    req.extensions_mut().insert(state);

    match chain.run(req).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
