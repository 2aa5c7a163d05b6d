//! Authentication guard.
//!
//! # Responsibilities
//! - Extract the Bearer token from the Authorization header
//! - Verify it against the principal store via the token codec
//! - Attach the verified caller as a request extension, or reject
//!
//! # Design Decisions
//! - Rejections are written directly by the guard (401 envelope) and
//!   never propagate as errors; the chain simply stops
//! - One rejection shape for every failure mode, matching the token
//!   codec's uniform `TokenInvalid`

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use crate::dispatch::chain::{ChainFlow, Guard};
use crate::http::error::envelope;
use crate::http::server::AppState;

/// Context attached to authenticated requests.
#[derive(Clone, Debug)]
pub struct AuthContext {
    /// Verified subject identifier.
    pub snowflake: String,

    /// Token issuance instant, epoch milliseconds.
    pub issued_at_millis: u64,
}

/// Guard requiring a valid signed token.
pub struct RequireAuth;

fn unauthorized() -> axum::response::Response {
    envelope(StatusCode::UNAUTHORIZED, "401", "Unauthorized.")
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl Guard for RequireAuth {
    async fn handle(&self, req: &mut Request<Body>, flow: &ChainFlow) {
        let Some(state) = req.extensions().get::<AppState>().cloned() else {
            // Dispatch always injects state; missing state is a wiring bug.
            flow.respond(envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500",
                "Internal error occurred.",
            ));
            return;
        };

        let Some(token) = bearer_token(req) else {
            flow.respond(unauthorized());
            return;
        };

        match state.tokens.verify(token, state.store.as_ref()).await {
            Ok(decoded) => {
                req.extensions_mut().insert(AuthContext {
                    snowflake: decoded.snowflake,
                    issued_at_millis: decoded.issued_at_millis,
                });
                flow.proceed();
            }
            Err(_invalid) => flow.respond(unauthorized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        let req = |value: &str| {
            Request::builder()
                .header(header::AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(bearer_token(&req("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&req("Bearer   spaced  ")), Some("spaced"));
        assert_eq!(bearer_token(&req("Basic abc")), None);
        assert_eq!(bearer_token(&req("Bearer ")), None);

        let bare = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&bare), None);
    }
}
