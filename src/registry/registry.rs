//! The process-wide resolver registry.
//!
//! A name-keyed map of boxed trait objects with `register`/`has`/`stats`
//! accessors, backed by a [`DashMap`] rather than a plain `HashMap` behind a
//! mutex, since resolvers can be registered from any thread at any time and
//! lookups happen on every single path evaluation.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::registry::backends::{basic::BasicResolver, jsonpath::JsonPathResolver};
use crate::registry::resolver::Resolver;

/// Aggregate counts describing what's currently registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryStats {
    /// Number of registered resolvers.
    pub resolver_count: usize,
    /// Whether a default resolver is set.
    pub has_default: bool,
}

/// The resolver registry: a name -> [`Resolver`] map plus a default pointer.
pub struct Registry {
    resolvers: DashMap<String, Arc<dyn Resolver>>,
    default: RwLock<Option<String>>,
}

impl Registry {
    fn empty() -> Self {
        Self {
            resolvers: DashMap::new(),
            default: RwLock::new(None),
        }
    }

    fn bootstrap() -> Self {
        let registry = Self::empty();

        #[cfg(feature = "jq")]
        {
            use crate::registry::backends::jq::JqResolver;
            match JqResolver::probe() {
                Ok(resolver) => {
                    log::info!("dilemma: 'jq' resolver available, set as default");
                    registry.register(Arc::new(resolver), true, None);
                }
                Err(reason) => {
                    log::warn!("dilemma: 'jq' resolver unavailable at startup: {reason}");
                }
            }
        }

        let jsonpath_default = !registry.has_default();
        registry.register(Arc::new(JsonPathResolver), jsonpath_default, None);
        if jsonpath_default {
            log::info!("dilemma: 'jsonpath' resolver set as default");
        }

        registry.register(Arc::new(BasicResolver), !registry.has_default(), None);

        registry
    }

    /// Register a resolver under `name` (falling back to [`Resolver::name`]
    /// when `None`), optionally promoting it to the default.
    pub fn register(&self, resolver: Arc<dyn Resolver>, make_default: bool, name: Option<&str>) {
        let name = name.map(str::to_string).unwrap_or_else(|| resolver.name().to_string());
        self.resolvers.insert(name.clone(), resolver);
        if make_default {
            *self.default.write() = Some(name);
        }
    }

    /// Look up a resolver by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Resolver>> {
        self.resolvers.get(name).map(|entry| entry.value().clone())
    }

    /// The current default resolver, if one has been registered.
    pub fn default_resolver(&self) -> Option<Arc<dyn Resolver>> {
        let name = self.default.read().clone()?;
        self.get(&name)
    }

    fn has_default(&self) -> bool {
        self.default.read().is_some()
    }

    /// The names of every registered resolver, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resolvers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot counts of registered resolvers and default status.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            resolver_count: self.resolvers.len(),
            has_default: self.has_default(),
        }
    }
}

/// The single process-wide registry, lazily bootstrapped with the built-in
/// resolvers on first access.
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::bootstrap);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::PathSegment;
    use crate::error::Result;
    use crate::model::{Context, Value};
    use crate::span::Span;

    struct StubResolver(&'static str);

    impl Resolver for StubResolver {
        fn name(&self) -> &str {
            self.0
        }

        fn resolve(&self, _segments: &[PathSegment], _context: &Context, _span: Span) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn register_and_lookup_by_name() {
        let registry = Registry::empty();
        registry.register(Arc::new(StubResolver("stub")), true, None);
        assert!(registry.get("stub").is_some());
        assert!(registry.default_resolver().is_some());
        assert_eq!(registry.stats().resolver_count, 1);
    }

    #[test]
    fn later_default_registration_overrides_earlier() {
        let registry = Registry::empty();
        registry.register(Arc::new(StubResolver("a")), true, None);
        registry.register(Arc::new(StubResolver("b")), true, None);
        assert_eq!(registry.default_resolver().unwrap().name(), "b");
    }

    #[test]
    fn explicit_name_overrides_the_resolvers_own_name() {
        let registry = Registry::empty();
        registry.register(Arc::new(StubResolver("stub")), true, Some("alias"));
        assert!(registry.get("alias").is_some());
        assert!(registry.get("stub").is_none());
    }

    #[test]
    fn process_wide_registry_boots_with_builtins() {
        let names = REGISTRY.names();
        assert!(names.contains(&"jsonpath".to_string()));
        assert!(names.contains(&"basic".to_string()));
        assert!(REGISTRY.default_resolver().is_some());
    }
}
