//! Zone resolution
//!
//! Finds the hosted zone a host's record belongs in. Providers only answer
//! "which zone is named exactly X", never "which zone contains X", so the
//! resolver walks up the label hierarchy one level at a time:
//!
//! ```text
//! baz.foo.bar.com
//!     └─ foo.bar.com   query → exactly one zone named foo.bar.com? done
//!         └─ bar.com   query → ...
//!             └─ com   query → ...
//!                 └─ (no labels left) → ZoneNotFound
//! ```
//!
//! The walk starts at the host's immediate parent: the host itself is
//! never treated as its own zone. Each step strictly shortens the name,
//! so the walk ends after at most `label_count - 1` queries.
//!
//! Individual lookup failures are expected (a level usually has no zone)
//! and are never surfaced. Only exhausting every level is an error.

use crate::domain::DomainName;
use crate::error::{Error, Result};
use crate::traits::{HostedZone, ZoneLookup};
use std::fmt;
use tracing::{debug, info, warn};

/// Zones requested per lookup
const MAX_ZONES_PER_LOOKUP: usize = 1;

/// Why a single level did not produce a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    /// The provider query itself failed
    Failed(String),
    /// The provider returned no zones
    Empty,
    /// The provider returned more than one zone
    Ambiguous(usize),
    /// The provider returned one zone, but for a different name
    NearMatch(String),
}

impl fmt::Display for LookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMiss::Failed(e) => write!(f, "lookup failed: {}", e),
            LookupMiss::Empty => f.write_str("no zones returned"),
            LookupMiss::Ambiguous(n) => write!(f, "{} zones returned", n),
            LookupMiss::NearMatch(name) => write!(f, "nearest zone is {}", name),
        }
    }
}

/// Resolve the hosted zone authoritative for `host`
///
/// # Parameters
///
/// - `host`: Fully-qualified host name to register
/// - `lookup`: Provider zone lookup capability
///
/// # Returns
///
/// - `Ok(HostedZone)`: The most specific ancestor zone of `host`
/// - `Err(Error::ZoneNotFound)`: No ancestor is a hosted zone
pub async fn resolve_zone<L>(host: &DomainName, lookup: &L) -> Result<HostedZone>
where
    L: ZoneLookup + ?Sized,
{
    let mut level = host.parent();

    while let Some(name) = level {
        match lookup_exact(&name, lookup).await {
            Ok(zone) => {
                info!("Resolved zone for {}: {}", host, zone);
                return Ok(zone);
            }
            Err(LookupMiss::Failed(e)) => {
                warn!("Zone lookup for {} failed, trying parent: {}", name, e);
            }
            Err(miss) => {
                debug!("No zone at {} ({}), trying parent", name, miss);
            }
        }

        level = name.parent();
    }

    Err(Error::zone_not_found(host.as_str()))
}

/// Query a single level and accept only an exact, unambiguous match
pub async fn lookup_exact<L>(
    name: &DomainName,
    lookup: &L,
) -> std::result::Result<HostedZone, LookupMiss>
where
    L: ZoneLookup + ?Sized,
{
    let mut zones = lookup
        .list_zones_by_name(name.as_str(), MAX_ZONES_PER_LOOKUP)
        .await
        .map_err(|e| LookupMiss::Failed(e.to_string()))?;

    match zones.len() {
        0 => Err(LookupMiss::Empty),
        1 => {
            let zone = zones.remove(0);
            if zone.name == *name {
                Ok(zone)
            } else {
                Err(LookupMiss::NearMatch(zone.name.to_string()))
            }
        }
        n => Err(LookupMiss::Ambiguous(n)),
    }
}
