//! Ordered extractor registry.
//!
//! Plugins are registered as `(name, factory)` pairs and resolved into
//! trait-object instances at scan start; there is no runtime reflection,
//! just a plain slice of constructors.

use super::{
    Capabilities, CargoLockExtractor, Extractor, NpmLockExtractor, RequirementsTxtExtractor,
};

pub type ExtractorFactory = fn() -> Box<dyn Extractor>;

#[derive(Default)]
pub struct Registry {
    entries: Vec<(String, ExtractorFactory)>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a stable name. Registration order is the
    /// order extractors run in and the order statuses are reported in.
    pub fn register(&mut self, name: impl Into<String>, factory: ExtractorFactory) -> &mut Self {
        self.entries.push((name.into(), factory));
        self
    }

    /// Registered names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Instantiate every registered extractor, in registration order.
    #[must_use]
    pub fn resolve(&self) -> Vec<Box<dyn Extractor>> {
        self.entries.iter().map(|(_, factory)| factory()).collect()
    }

    /// Instantiate only the extractors whose requirements `caps` satisfies.
    #[must_use]
    pub fn resolve_for(&self, caps: &Capabilities) -> Vec<Box<dyn Extractor>> {
        self.resolve()
            .into_iter()
            .filter(|extractor| caps.satisfies(&extractor.requirements()))
            .collect()
    }
}

/// The registry with all built-in extractors.
#[must_use]
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register("rust/cargo-lock", || Box::new(CargoLockExtractor))
        .register("javascript/package-lock", || Box::new(NpmLockExtractor))
        .register("python/requirements", || {
            Box::new(RequirementsTxtExtractor)
        });
    registry
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
