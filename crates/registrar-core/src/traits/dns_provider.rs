// # DNS Provider Traits
//
// Defines the two capabilities the registrar needs from a managed DNS
// service: finding hosted zones by name, and submitting a record change.
//
// ## Implementations
//
// - Amazon Route 53: `registrar-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use registrar_core::{ChangeSet, DnsProvider};
//
// #[tokio::main]
// async fn main() -> Result<(), Box<dyn std::error::Error>> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.list_zones_by_name("bar.com", 1).await?;
//     let change = ChangeSet::upsert_a("foo.bar.com", "10.0.0.5");
//     provider.submit_change(&change, &zones[0].id).await?;
//
//     Ok(())
// }
// ```

use crate::domain::DomainName;
use crate::record::ChangeSet;
use async_trait::async_trait;
use std::fmt;

/// Prefix Route 53 puts in front of hosted zone IDs
const HOSTED_ZONE_ID_PREFIX: &str = "/hostedzone/";

/// A provider's record of an authoritative subtree
///
/// This is a read view into provider state; the registrar never creates
/// or modifies zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Provider-assigned opaque ID
    pub id: String,
    /// The name the zone is authoritative for
    pub name: DomainName,
}

impl HostedZone {
    /// Create a new hosted zone view
    pub fn new(id: impl Into<String>, name: DomainName) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }

    /// The zone ID without a `/hostedzone/` prefix
    pub fn bare_id(&self) -> &str {
        bare_zone_id(&self.id)
    }
}

/// Strip the `/hostedzone/` prefix from a zone ID, if present
pub fn bare_zone_id(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_ID_PREFIX).unwrap_or(id)
}

impl fmt::Display for HostedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.bare_id())
    }
}

/// Propagation status of a submitted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Accepted but not yet propagated to all authoritative servers
    Pending,
    /// Propagated
    Insync,
    /// Any status the provider reports that we do not model
    Other(String),
}

impl From<&str> for ChangeStatus {
    fn from(status: &str) -> Self {
        match status {
            "PENDING" => ChangeStatus::Pending,
            "INSYNC" => ChangeStatus::Insync,
            other => ChangeStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Pending => f.write_str("PENDING"),
            ChangeStatus::Insync => f.write_str("INSYNC"),
            ChangeStatus::Other(s) => f.write_str(s),
        }
    }
}

/// The provider's receipt for a submitted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Provider-assigned change ID
    pub id: String,
    /// Current status of the change
    pub status: ChangeStatus,
    /// Submission timestamp as reported by the provider
    pub submitted_at: Option<String>,
}

/// Zone lookup capability
///
/// # Semantics
///
/// The lookup is a by-name listing, not a containment query: providers
/// may return zones whose names merely sort after `name`. Callers that
/// need an exact match must compare names themselves.
#[async_trait]
pub trait ZoneLookup: Send + Sync {
    /// List hosted zones starting at `name`
    ///
    /// # Parameters
    ///
    /// - `name`: The DNS name to search from
    /// - `max_items`: Upper bound on the number of zones returned
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<HostedZone>)`: Zones in provider order (possibly empty)
    /// - `Err(Error)`: If the query failed
    async fn list_zones_by_name(
        &self,
        name: &str,
        max_items: usize,
    ) -> Result<Vec<HostedZone>, crate::Error>;
}

/// Change submission capability
#[async_trait]
pub trait ChangeSubmitter: Send + Sync {
    /// Submit a change set against a hosted zone
    ///
    /// Makes exactly one request; never retries.
    ///
    /// # Parameters
    ///
    /// - `change_set`: The change to apply
    /// - `zone_id`: Target hosted zone ID (as returned by [`ZoneLookup`])
    async fn submit_change(
        &self,
        change_set: &ChangeSet,
        zone_id: &str,
    ) -> Result<ChangeInfo, crate::Error>;
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// DNS providers are **untrusted** components with strict limitations:
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide which zone a record belongs to (owned by the zone resolver)
/// - ❌ Cache state beyond single request
pub trait DnsProvider: ZoneLookup + ChangeSubmitter {
    /// Get the provider name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the provider (e.g., "route53")
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
