//! Validated route descriptors.
//!
//! A route module exports either one descriptor or an ordered sequence of
//! them. Construction goes through [`RouteDescriptor::builder`], which
//! yields a well-formed value or a [`RouteBuildError`], so dispatch never
//! shape-checks routes at request time.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use super::chain::Guard;
use crate::http::error::ApiError;

/// The HTTP methods a route may register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Options,
    Patch,
    Delete,
}

impl Method {
    /// Parse a method name as it appears in a route module.
    pub fn parse(name: &str) -> Result<Self, RouteBuildError> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "OPTIONS" => Ok(Self::Options),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(RouteBuildError::InvalidMethod(other.to_string())),
        }
    }

    /// Map a transport-level method onto the registrable set.
    pub fn from_http(method: &axum::http::Method) -> Option<Self> {
        match *method {
            axum::http::Method::GET => Some(Self::Get),
            axum::http::Method::POST => Some(Self::Post),
            axum::http::Method::OPTIONS => Some(Self::Options),
            axum::http::Method::PATCH => Some(Self::Patch),
            axum::http::Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Terminal handler invoked once a route's chain is exhausted.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, req: Request<Body>) -> Result<Response, ApiError>;
}

/// Adapter turning an async closure into a [`RequestHandler`].
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, ApiError>> + Send,
{
    async fn handle(&self, req: Request<Body>) -> Result<Response, ApiError> {
        (self.0)(req).await
    }
}

/// Box an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RequestHandler>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// An immutable, validated route registration.
pub struct RouteDescriptor {
    pub path: String,
    pub method: Method,

    /// Opaque pre-handlers, run before the route's own guards.
    pub middleware: Vec<Arc<dyn Guard>>,

    /// Ordered authorization chain.
    pub guards: Vec<Arc<dyn Guard>>,

    pub handler: Arc<dyn RequestHandler>,
}

impl RouteDescriptor {
    pub fn builder() -> RouteBuilder {
        RouteBuilder::default()
    }
}

/// What a route module exports: one descriptor or an ordered sequence.
pub enum RouteExport {
    Single(RouteDescriptor),
    Many(Vec<RouteDescriptor>),
}

impl RouteExport {
    /// Flatten into registration order.
    pub fn into_descriptors(self) -> Vec<RouteDescriptor> {
        match self {
            Self::Single(d) => vec![d],
            Self::Many(ds) => ds,
        }
    }
}

/// A descriptor that failed validated construction.
#[derive(Debug, thiserror::Error)]
pub enum RouteBuildError {
    #[error("route has no path")]
    MissingPath,
    #[error("route path is empty")]
    EmptyPath,
    #[error("route has no method")]
    MissingMethod,
    #[error("invalid method name: {0}")]
    InvalidMethod(String),
    #[error("route has no handler")]
    MissingHandler,
}

/// Builder yielding a well-formed [`RouteDescriptor`] or an error.
#[derive(Default)]
pub struct RouteBuilder {
    path: Option<String>,
    method: Option<Method>,
    middleware: Vec<Arc<dyn Guard>>,
    guards: Vec<Arc<dyn Guard>>,
    handler: Option<Arc<dyn RequestHandler>>,
}

impl RouteBuilder {
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Append an opaque pre-handler (runs before every guard).
    pub fn middleware(mut self, mw: Arc<dyn Guard>) -> Self {
        self.middleware.push(mw);
        self
    }

    /// Append a guard; declaration order is execution order.
    pub fn guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<RouteDescriptor, RouteBuildError> {
        let path = self.path.ok_or(RouteBuildError::MissingPath)?;
        if path.is_empty() {
            return Err(RouteBuildError::EmptyPath);
        }
        Ok(RouteDescriptor {
            path,
            method: self.method.ok_or(RouteBuildError::MissingMethod)?,
            middleware: self.middleware,
            guards: self.guards,
            handler: self.handler.ok_or(RouteBuildError::MissingHandler)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn ok_handler() -> Arc<dyn RequestHandler> {
        handler_fn(|_req| async { Ok("ok".into_response()) })
    }

    #[test]
    fn builder_rejects_missing_fields() {
        assert!(matches!(
            RouteDescriptor::builder().build(),
            Err(RouteBuildError::MissingPath)
        ));
        assert!(matches!(
            RouteDescriptor::builder().path("").build(),
            Err(RouteBuildError::EmptyPath)
        ));
        assert!(matches!(
            RouteDescriptor::builder().path("/x").build(),
            Err(RouteBuildError::MissingMethod)
        ));
        assert!(matches!(
            RouteDescriptor::builder()
                .path("/x")
                .method(Method::Get)
                .build(),
            Err(RouteBuildError::MissingHandler)
        ));
    }

    #[test]
    fn builder_accepts_a_complete_route() {
        let route = RouteDescriptor::builder()
            .path("/x")
            .method(Method::Get)
            .handler(ok_handler())
            .build()
            .unwrap();
        assert_eq!(route.path, "/x");
        assert_eq!(route.method, Method::Get);
        assert!(route.guards.is_empty());
    }

    #[test]
    fn method_parsing_is_case_insensitive_and_closed() {
        assert_eq!(Method::parse("get").unwrap(), Method::Get);
        assert_eq!(Method::parse("PATCH").unwrap(), Method::Patch);
        assert!(matches!(
            Method::parse("TRACE"),
            Err(RouteBuildError::InvalidMethod(_))
        ));
    }
}
