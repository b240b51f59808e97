// # registrar-core
//
// Core library for registering a host's address as an A record in the
// managed DNS zone that owns its name.
//
// ## Architecture Overview
//
// - **MetadataSource**: Trait for reading the instance's own addresses
// - **ZoneLookup / ChangeSubmitter / DnsProvider**: Traits for the managed DNS service
// - **zone**: Walks up the host's labels to find the authoritative hosted zone
// - **address**: Picks the address to publish, with fallbacks
// - **record**: Builds the UPSERT change set
// - **Registrar**: Runs the whole sequence once
// - **ProviderRegistry**: Plugin-based registry for providers and metadata sources
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider implementations
// 2. **Substitutable Collaborators**: Every external call goes through a trait object
// 3. **Single Shot**: One attempt per run, no retries, no persisted local state
// 4. **Library-First**: All core functionality can be used as a library

pub mod address;
pub mod config;
pub mod domain;
pub mod error;
pub mod record;
pub mod registrar;
pub mod registry;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use config::{MetadataConfig, ProviderConfig, RegistrarConfig, RunOptions};
pub use domain::DomainName;
pub use error::{Error, Result};
pub use record::{ChangeAction, ChangeSet, RecordType, ResourceRecordSet};
pub use registrar::{RegistrationEvent, RegistrationOutcome, Registrar};
pub use registry::ProviderRegistry;
pub use traits::{
    ChangeInfo, ChangeStatus, ChangeSubmitter, DnsProvider, HostedZone, MetadataSource,
    ZoneLookup,
};
