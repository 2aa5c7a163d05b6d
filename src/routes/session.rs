//! Session issuance and the authenticated identity route.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::dispatch::descriptor::handler_fn;
use crate::dispatch::{Method, ModuleError, RouteDescriptor, RouteExport};
use crate::http::auth::{AuthContext, RequireAuth};
use crate::http::error::ApiError;
use crate::http::server::AppState;

const BODY_LIMIT: usize = 64 * 1024;

#[derive(Deserialize)]
struct SessionRequest {
    credential_key: String,
}

pub fn routes() -> Result<RouteExport, ModuleError> {
    Ok(RouteExport::Many(vec![
        RouteDescriptor::builder()
            .path("/api/v0/session")
            .method(Method::Post)
            .handler(handler_fn(create_session))
            .build()?,
        RouteDescriptor::builder()
            .path("/api/v0/me")
            .method(Method::Get)
            .guard(Arc::new(RequireAuth))
            .handler(handler_fn(whoami))
            .build()?,
    ]))
}

/// Issue a signed token for the principal named by `credential_key`.
async fn create_session(req: Request<Body>) -> Result<Response, ApiError> {
    let state = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| ApiError::internal("application state missing from request"))?;

    let bytes = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
        .await
        .map_err(|e| ApiError::Validation(format!("unreadable body: {e}")))?;
    let body: SessionRequest = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::Validation("expected {\"credential_key\": ...}".into()))?;

    let principal = state
        .store
        .lookup_by_credential_key(&body.credential_key)
        .await?
        .ok_or_else(|| ApiError::client(StatusCode::UNAUTHORIZED, "401", "Unauthorized."))?;

    let token = state.tokens.sign(&principal);
    tracing::info!(snowflake = %principal.snowflake, "session issued");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "snowflake": principal.snowflake })),
    )
        .into_response())
}

/// Identity of the verified caller. Only reachable past [`RequireAuth`].
async fn whoami(req: Request<Body>) -> Result<Response, ApiError> {
    let ctx = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::internal("auth context missing past the auth guard"))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "snowflake": ctx.snowflake })),
    )
        .into_response())
}
