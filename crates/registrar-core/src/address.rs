//! Address resolution
//!
//! Picks the IPv4 address to publish for this host:
//!
//! 1. Metadata service unavailable → `127.0.0.1` (degraded mode, lets the
//!    rest of the run be exercised off-instance)
//! 2. Public address attribute, if it answers with something non-empty
//! 3. Local address attribute
//! 4. Nothing → [`Error::AddressUnavailable`]
//!
//! Attribute values are parsed leniently: a malformed value becomes
//! `0.0.0.0` instead of an error. See [`parse_address_lenient`].

use crate::error::{Error, Result};
use crate::traits::MetadataSource;
use std::net::Ipv4Addr;
use tracing::{info, warn};

/// Metadata path of the instance's public IPv4 address
pub const PUBLIC_IPV4_PATH: &str = "/public-ipv4";

/// Metadata path of the instance's private IPv4 address
pub const LOCAL_IPV4_PATH: &str = "/local-ipv4";

/// Address published when no metadata service is reachable
pub const FALLBACK_ADDRESS: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Resolve the address to publish
///
/// # Returns
///
/// - `Ok(Ipv4Addr)`: The address to register
/// - `Err(Error::AddressUnavailable)`: Both the public and the local
///   attribute failed
pub async fn resolve_address(source: &dyn MetadataSource) -> Result<Ipv4Addr> {
    if !source.available().await {
        info!(
            "No metadata detected from {}, using {}",
            source.source_name(),
            FALLBACK_ADDRESS
        );
        return Ok(FALLBACK_ADDRESS);
    }

    let public = match source.get_metadata(PUBLIC_IPV4_PATH).await {
        Ok(value) if !value.trim().is_empty() => Some(value),
        Ok(_) => {
            warn!("Public address from {} is empty", source.source_name());
            None
        }
        Err(e) => {
            warn!(
                "Couldn't get public address from {}: {}",
                source.source_name(),
                e
            );
            None
        }
    };

    let raw = match public {
        Some(value) => value,
        None => source.get_metadata(LOCAL_IPV4_PATH).await.map_err(|e| {
            Error::address_unavailable(format!(
                "couldn't get a local address from {} either: {}",
                source.source_name(),
                e
            ))
        })?,
    };

    Ok(parse_address_lenient(&raw))
}

/// Parse an IPv4 address, mapping malformed input to `0.0.0.0`
///
/// This keeps the historical behavior of the registrar: a garbage value
/// from the metadata service is published as the unspecified address
/// rather than aborting the run. A warning is logged when it happens.
pub fn parse_address_lenient(raw: &str) -> Ipv4Addr {
    match raw.trim().parse() {
        Ok(addr) => addr,
        Err(_) => {
            warn!(
                "Metadata returned malformed address '{}', using {}",
                raw,
                Ipv4Addr::UNSPECIFIED
            );
            Ipv4Addr::UNSPECIFIED
        }
    }
}
