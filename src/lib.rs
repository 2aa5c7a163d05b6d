//! Girder: a minimal web-service scaffold.
//!
//! Signed-token authentication (snowflake ids, HMAC-signed tokens) and a
//! route-discovery dispatch engine (guard chains, error boundary), served
//! over Tokio and Axum.

pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod http;
pub mod id;
pub mod principal;
pub mod routes;
pub mod token;

pub use config::AppConfig;
pub use http::{AppState, HttpServer};
