//! Route modules.
//!
//! # Data Flow
//! ```text
//! sources(): the registration tree (mirrors the module nesting)
//!     → dispatch::RouteRegistry::discover
//!     → DispatchTable
//! ```
//!
//! # Design Decisions
//! - Each module exports `routes()` returning a Single or Many export
//! - Grouping follows the URL hierarchy, not implementation convenience
//! - Adding a module means adding one line to its parent group

pub mod session;
pub mod test;

use crate::dispatch::{ModuleError, RouteSource};

/// The full registration tree walked at startup.
pub fn sources() -> Vec<RouteSource> {
    vec![RouteSource::group("api/v0", api_v0)]
}

fn api_v0() -> Result<Vec<RouteSource>, ModuleError> {
    Ok(vec![
        RouteSource::module("api/v0/test", test::routes),
        RouteSource::module("api/v0/session", session::routes),
    ])
}
