//! Route discovery and the dispatch table.
//!
//! # Responsibilities
//! - Recurse through a registration tree of route modules and groups
//! - Register well-formed descriptors, skip malformed ones with a warning
//! - Freeze the result as an immutable, concurrently readable table
//!
//! # Design Decisions
//! - Discovery is a static walk over compiled registration functions; no
//!   filesystem scanning or dynamic loading at runtime
//! - A failing module or group is logged and skipped; its siblings are
//!   still visited, and startup never aborts over one bad subtree
//! - (method, path) collisions keep the first registration and drop the
//!   rest with a warning

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::chain::{Guard, GuardChain};
use super::descriptor::{Method, RequestHandler, RouteBuildError, RouteDescriptor, RouteExport};

/// A route module or group failed to produce its export.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error(transparent)]
    Build(#[from] RouteBuildError),
    #[error("{0}")]
    Unavailable(String),
}

/// One node of the registration tree.
pub struct RouteSource {
    /// Name used in discovery warnings.
    pub name: &'static str,
    pub kind: SourceKind,
}

/// What a tree node yields when visited.
pub enum SourceKind {
    /// A leaf: constructs this module's export.
    Module(fn() -> Result<RouteExport, ModuleError>),

    /// A subtree: enumerates nested sources. Enumeration itself may fail
    /// (the analogue of an unreadable subdirectory) without aborting the
    /// walk.
    Group(fn() -> Result<Vec<RouteSource>, ModuleError>),
}

impl RouteSource {
    pub fn module(name: &'static str, f: fn() -> Result<RouteExport, ModuleError>) -> Self {
        Self {
            name,
            kind: SourceKind::Module(f),
        }
    }

    pub fn group(name: &'static str, f: fn() -> Result<Vec<RouteSource>, ModuleError>) -> Self {
        Self {
            name,
            kind: SourceKind::Group(f),
        }
    }
}

/// A route compiled for dispatch: pre-handlers and guards flattened into
/// one chain in front of the terminal handler.
pub struct CompiledRoute {
    guards: Vec<Arc<dyn Guard>>,
    handler: Arc<dyn RequestHandler>,
}

impl CompiledRoute {
    /// Build the per-request chain driver for this route.
    pub fn chain(&self, guard_timeout: Duration) -> GuardChain {
        GuardChain::new(self.guards.clone(), self.handler.clone(), guard_timeout)
    }
}

/// Immutable mapping from (method, path) to compiled routes.
///
/// Built once during startup, published behind an `Arc`, and read without
/// synchronization from every request task.
#[derive(Default)]
pub struct DispatchTable {
    routes: HashMap<(Method, String), Arc<CompiledRoute>>,
}

impl DispatchTable {
    pub fn lookup(&self, method: Method, path: &str) -> Option<Arc<CompiledRoute>> {
        self.routes.get(&(method, path.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Startup-only discovery of the registration tree.
pub struct RouteRegistry;

impl RouteRegistry {
    /// Walk `sources` recursively and build the dispatch table.
    ///
    /// Must complete before the table is used; nothing mutates the table
    /// afterwards.
    pub fn discover(sources: &[RouteSource]) -> DispatchTable {
        let mut table = DispatchTable::default();
        Self::walk(sources, &mut table);
        tracing::info!(routes = table.len(), "route discovery complete");
        table
    }

    fn walk(sources: &[RouteSource], table: &mut DispatchTable) {
        for source in sources {
            match &source.kind {
                SourceKind::Module(load) => match load() {
                    Ok(export) => {
                        for descriptor in export.into_descriptors() {
                            Self::register(source.name, descriptor, table);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            module = source.name,
                            error = %e,
                            "skipping malformed route module"
                        );
                    }
                },
                SourceKind::Group(enumerate) => match enumerate() {
                    Ok(children) => Self::walk(&children, table),
                    Err(e) => {
                        tracing::warn!(
                            group = source.name,
                            error = %e,
                            "skipping unreadable route group"
                        );
                    }
                },
            }
        }
    }

    fn register(module: &str, descriptor: RouteDescriptor, table: &mut DispatchTable) {
        let key = (descriptor.method, descriptor.path.clone());
        if table.routes.contains_key(&key) {
            tracing::warn!(
                module,
                method = descriptor.method.as_str(),
                path = %descriptor.path,
                "duplicate route registration dropped; first registration wins"
            );
            return;
        }

        let mut guards = descriptor.middleware;
        guards.extend(descriptor.guards);
        tracing::debug!(
            module,
            method = descriptor.method.as_str(),
            path = %descriptor.path,
            guards = guards.len(),
            "route registered"
        );
        table.routes.insert(
            key,
            Arc::new(CompiledRoute {
                guards,
                handler: descriptor.handler,
            }),
        );
    }
}
