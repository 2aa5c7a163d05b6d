//! HTTP transport layer.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → request.rs (attach correlation id)
//!     → server.rs (dispatch table lookup)
//!     → dispatch::chain (guards, then terminal handler)
//!     → error.rs (boundary translation)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - One wildcard axum route funnels everything through the crate's own
//!   dispatch table; the framework never owns per-route wiring
//! - Unmatched requests answer the fixed 404 envelope
//! - Guard rejections and handler errors both pass the error boundary

pub mod auth;
pub mod error;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
