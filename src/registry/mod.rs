//! Pluggable path/raw-query resolution.
//!
//! An [`Expr::Path`](crate::ast::Expr::Path) or
//! [`Expr::RawPath`](crate::ast::Expr::RawPath) never touches a
//! [`Context`](crate::model::Context) directly — it goes through whichever
//! [`Resolver`] is registered under its name, or the process-wide default.

mod backends;
mod registry;
mod resolver;

pub use registry::RegistryStats;
use registry::REGISTRY;
pub use resolver::Resolver;

use std::sync::Arc;

/// Register a resolver, optionally making it the default used by plain
/// (non-hinted) `Path`/`RawPath` expressions and optionally under an
/// explicit name rather than its own [`Resolver::name`].
pub fn register_resolver(resolver: impl Resolver + 'static, make_default: bool, name: Option<&str>) {
    REGISTRY.register(Arc::new(resolver), make_default, name);
}

/// Look up a resolver by name.
pub fn resolver_by_name(name: &str) -> Option<Arc<dyn Resolver>> {
    REGISTRY.get(name)
}

/// The current default resolver.
pub fn default_resolver() -> Option<Arc<dyn Resolver>> {
    REGISTRY.default_resolver()
}

/// Snapshot counts of what's currently registered.
pub fn stats() -> RegistryStats {
    REGISTRY.stats()
}
