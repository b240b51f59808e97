// # Metadata Source Trait
//
// Defines the interface for reading the instance's own network attributes
// from a metadata service.
//
// ## Implementations
//
// - EC2 Instance Metadata Service: `registrar-metadata-imds` crate
//
// ## Usage
//
// ```rust,ignore
// use registrar_core::MetadataSource;
//
// #[tokio::main]
// async fn main() -> Result<(), Box<dyn std::error::Error>> {
//     let source = /* MetadataSource implementation */;
//
//     if source.available().await {
//         let ip = source.get_metadata("/public-ipv4").await?;
//         println!("public address: {}", ip);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for instance metadata sources
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Semi-Trusted
///
/// Metadata sources may perform I/O against their metadata endpoint and
/// nothing else.
///
/// ## Allowed Capabilities
/// - ✅ Query the metadata endpoint
/// - ✅ Keep a session token for the lifetime of the source object
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed query is reported, the caller decides)
/// - ❌ Interpret attribute values (parsing is owned by the address resolver)
/// - ❌ Spawn tasks
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Whether the metadata service is reachable at all
    ///
    /// A `false` here puts the address resolver into its loopback
    /// fallback, so implementations should answer quickly.
    async fn available(&self) -> bool;

    /// Read one metadata attribute
    ///
    /// # Parameters
    ///
    /// - `path`: Attribute path relative to the metadata root (e.g. `/public-ipv4`)
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The raw attribute value (may be empty)
    /// - `Err(Error)`: If the attribute is missing or the query failed
    async fn get_metadata(&self, path: &str) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing metadata sources from configuration
pub trait MetadataSourceFactory: Send + Sync {
    /// Create a MetadataSource instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this metadata source type
    ///
    /// # Returns
    ///
    /// A boxed MetadataSource trait object
    fn create(
        &self,
        config: &crate::config::MetadataConfig,
    ) -> Result<Box<dyn MetadataSource>, crate::Error>;
}
