//! Per-request correlation ids.
//!
//! # Responsibilities
//! - Attach a unique request ID (UUID v4) to every inbound request
//! - Echo the ID on the response for client-side correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible so every log line carries it
//! - An inbound `x-request-id` header is trusted and propagated as-is

use axum::body::Body;
use axum::http::{header::HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Middleware assigning (or propagating) the request correlation id.
pub async fn request_id_middleware(mut req: Request<Body>, next: Next) -> Response {
    let id = match req.headers().get(&X_REQUEST_ID) {
        Some(existing) => existing.clone(),
        None => {
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .expect("uuid is a valid header value");
            req.headers_mut().insert(X_REQUEST_ID, generated.clone());
            generated
        }
    };

    let mut response = next.run(req).await;
    response.headers_mut().insert(X_REQUEST_ID, id);
    response
}

/// Read the correlation id off a request, if present.
pub fn request_id(req: &Request<Body>) -> &str {
    req.headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
