//! Provider registry.
//!
//! The registry is built once from configuration and never changes afterwards.
//! It owns the provider instances and their attempt order; failover itself
//! lives in [`FailoverCoordinator`](super::FailoverCoordinator).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::info;

use crate::errors::ConfigError;
use crate::provider::MarketDataProvider;

/// A provider registered under a unique name with an attempt priority.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Unique registry name
    pub name: String,
    /// The adapter
    pub provider: Arc<dyn MarketDataProvider>,
    /// Lower values are attempted first
    pub priority: u32,
}

impl RegistryEntry {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn MarketDataProvider>,
        priority: u32,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            priority,
        }
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("provider", &self.provider.display_name())
            .field("priority", &self.priority)
            .finish()
    }
}

/// Immutable, priority-ordered set of providers.
#[derive(Debug)]
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
}

impl ProviderRegistry {
    /// Create a registry from its entries.
    ///
    /// Entries are ordered by ascending priority; equal priorities keep their
    /// list order. Duplicate names and an empty list are rejected.
    pub fn new(mut entries: Vec<RegistryEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateProvider(entry.name.clone()));
            }
        }

        // Vec::sort_by_key is stable
        entries.sort_by_key(|e| e.priority);

        info!(
            "Provider registry initialized: {}",
            entries
                .iter()
                .map(|e| format!("{} ({})", e.name, e.priority))
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Self { entries })
    }

    /// Providers in attempt order.
    pub fn ordered_providers(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Look up a provider by registry name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn MarketDataProvider>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.provider)
    }

    /// Registry names in attempt order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MarketDataError;
    use crate::models::CompanySnapshot;

    struct NamedProvider(&'static str);

    #[async_trait::async_trait]
    impl MarketDataProvider for NamedProvider {
        fn id(&self) -> &str {
            self.0
        }

        async fn fetch(&self, _symbol: &str) -> Result<CompanySnapshot, MarketDataError> {
            CompanySnapshot::new("Test Co", self.0)
        }
    }

    fn entry(name: &'static str, priority: u32) -> RegistryEntry {
        RegistryEntry::new(name, Arc::new(NamedProvider(name)), priority)
    }

    #[test]
    fn test_provider_ordering_by_priority() {
        let registry = ProviderRegistry::new(vec![
            entry("LOW_PRIORITY", 20),
            entry("HIGH_PRIORITY", 5),
            entry("MED_PRIORITY", 10),
        ])
        .unwrap();

        assert_eq!(
            registry.names(),
            vec!["HIGH_PRIORITY", "MED_PRIORITY", "LOW_PRIORITY"]
        );
    }

    #[test]
    fn test_equal_priorities_keep_list_order() {
        let registry = ProviderRegistry::new(vec![
            entry("second", 1),
            entry("first", 0),
            entry("third", 1),
            entry("fourth", 1),
        ])
        .unwrap();

        assert_eq!(registry.names(), vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = ProviderRegistry::new(vec![entry("alpha", 0), entry("alpha", 1)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProvider(name) if name == "alpha"));
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert!(matches!(
            ProviderRegistry::new(Vec::new()),
            Err(ConfigError::NoProviders)
        ));
    }

    #[test]
    fn test_lookup_by_name() {
        let registry =
            ProviderRegistry::new(vec![entry("alpha", 0), entry("indian", 1)]).unwrap();

        assert_eq!(registry.get("indian").map(|p| p.id()), Some("indian"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}
