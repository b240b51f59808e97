//! Core traits for the registrar
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`MetadataSource`]: Read the instance's own network attributes
//! - [`ZoneLookup`]: Find hosted zones by name
//! - [`ChangeSubmitter`]: Submit a record change to a hosted zone
//! - [`DnsProvider`]: A provider offering both of the above

pub mod dns_provider;
pub mod metadata_source;

pub use dns_provider::{
    ChangeInfo, ChangeStatus, ChangeSubmitter, DnsProvider, DnsProviderFactory, HostedZone,
    ZoneLookup, bare_zone_id,
};
pub use metadata_source::{MetadataSource, MetadataSourceFactory};
