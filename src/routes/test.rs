//! Demo routes exercising the dispatch path end to end.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::dispatch::descriptor::handler_fn;
use crate::dispatch::{Method, ModuleError, RouteDescriptor, RouteExport};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Reserved code returned by the always-failing test route.
pub const TEST_ERROR_CODE: &str = "1000";

/// Process-scoped counter state, injected through [`AppState`] rather
/// than living as ambient module state.
#[derive(Default)]
pub struct TestState {
    pub hits: AtomicU64,
}

pub fn routes() -> Result<RouteExport, ModuleError> {
    Ok(RouteExport::Many(vec![
        RouteDescriptor::builder()
            .path("/api/v0/test/1")
            .method(Method::Get)
            .handler(handler_fn(counter))
            .build()?,
        RouteDescriptor::builder()
            .path("/api/v0/test/2")
            .method(Method::Get)
            .handler(handler_fn(always_fails))
            .build()?,
    ]))
}

/// Returns a monotonically increasing number per process lifetime.
async fn counter(req: Request<Body>) -> Result<Response, ApiError> {
    let state = req
        .extensions()
        .get::<AppState>()
        .ok_or_else(|| ApiError::internal("application state missing from request"))?;

    let number = state.test_state.hits.fetch_add(1, Ordering::SeqCst);
    Ok((
        StatusCode::OK,
        Json(json!({ "test": "successful", "number": number })),
    )
        .into_response())
}

/// Always answers the reserved structured test error.
async fn always_fails(_req: Request<Body>) -> Result<Response, ApiError> {
    Err(ApiError::client(
        StatusCode::BAD_REQUEST,
        TEST_ERROR_CODE,
        "Test error.",
    ))
}
