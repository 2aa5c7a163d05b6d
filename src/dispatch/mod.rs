//! Route discovery and guard-chained dispatch.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteSource tree (modules and groups)
//!     → descriptor.rs (validated construction)
//!     → registry.rs (first-wins registration)
//!     → Freeze as immutable DispatchTable
//!
//! Incoming Request (method, path):
//!     → DispatchTable lookup
//!     → chain.rs (guards in declaration order, then terminal handler)
//!     → Response, or ApiError through the error boundary
//! ```
//!
//! # Design Decisions
//! - Discovery completes before the table is published; no live reload
//! - First registration wins on a (method, path) collision
//! - Malformed modules and failing groups are warnings, never fatal
//! - Chain state is per-request; guards share nothing across requests

pub mod chain;
pub mod descriptor;
pub mod registry;

pub use chain::{ChainFlow, Guard, GuardChain};
pub use descriptor::{
    FnHandler, Method, RequestHandler, RouteBuildError, RouteDescriptor, RouteExport,
};
pub use registry::{
    CompiledRoute, DispatchTable, ModuleError, RouteRegistry, RouteSource, SourceKind,
};
