//! Plugin-based provider registry
//!
//! The registry allows DNS providers and metadata sources to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registrar_core::registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! registrar_provider_route53::register(&registry);
//! registrar_metadata_imds::register(&registry);
//!
//! let provider = registry.create_provider(&config.provider)?;
//! let metadata = registry.create_metadata_source(&config.metadata)?;
//! ```

use crate::config::{MetadataConfig, ProviderConfig};
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory, MetadataSource, MetadataSourceFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Provider registry for plugin-based component creation
///
/// Maps type names to factory objects.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,

    /// Registered metadata source factories
    metadata_sources: RwLock<HashMap<String, Box<dyn MetadataSourceFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "route53")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name.into(), factory);
    }

    /// Register a metadata source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Metadata source type name (e.g., "imds")
    /// - `factory`: Factory object for creating metadata source instances
    pub fn register_metadata_source(
        &self,
        name: impl Into<String>,
        factory: Box<dyn MetadataSourceFactory>,
    ) {
        let mut sources = self
            .metadata_sources
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sources.insert(name.into(), factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// Create a metadata source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn MetadataSource>)`: Created metadata source instance
    /// - `Err(Error)`: If source type is not registered or creation fails
    pub fn create_metadata_source(
        &self,
        config: &MetadataConfig,
    ) -> Result<Box<dyn MetadataSource>> {
        let source_type = config.type_name();
        let sources = self
            .metadata_sources
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = sources.get(source_type).ok_or_else(|| {
            Error::config(format!("Unknown metadata source type: {}", source_type))
        })?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.contains_key(name)
    }

    /// Check if a metadata source type is registered
    pub fn has_metadata_source(&self, name: &str) -> bool {
        let sources = self
            .metadata_sources
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sources.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProviderFactory;

    impl DnsProviderFactory for MockProviderFactory {
        fn create(&self, _config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
            Err(Error::not_found("Mock provider not implemented"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();

        assert!(!registry.has_provider("route53"));

        registry.register_provider("route53", Box::new(MockProviderFactory));

        assert!(registry.has_provider("route53"));
        assert!(registry.list_providers().contains(&"route53".to_string()));
    }

    #[test]
    fn test_unknown_metadata_source() {
        let registry = ProviderRegistry::new();
        let result = registry.create_metadata_source(&MetadataConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_factory_error_propagates() {
        let registry = ProviderRegistry::new();
        registry.register_provider("route53", Box::new(MockProviderFactory));

        let config = ProviderConfig::Route53 {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            session_token: None,
            profile: None,
            credentials_file: None,
            imds_endpoint: None,
            endpoint: None,
        };

        assert!(matches!(
            registry.create_provider(&config),
            Err(Error::NotFound(_))
        ));
    }
}
