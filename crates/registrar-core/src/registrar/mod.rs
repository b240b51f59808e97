//! Registration orchestrator
//!
//! The Registrar is responsible for one registration run:
//! - Resolving the address to publish via MetadataSource
//! - Resolving the target hosted zone via the provider's ZoneLookup
//! - Building the UPSERT change set
//! - Submitting it via the provider's ChangeSubmitter
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   address    ┌──────────────┐
//! │ MetadataSource │─────────────▶│              │
//! └────────────────┘              │  Registrar   │──▶ RegistrationEvent
//! ┌────────────────┐   zone       │              │
//! │  ZoneLookup    │─────────────▶│              │
//! └────────────────┘              └──────────────┘
//!                                        │ ChangeSet + zone id
//!                                        ▼
//!                                ┌────────────────┐
//!                                │ChangeSubmitter │
//!                                └────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! 1. No address → run aborts ([`crate::Error::AddressUnavailable`])
//! 2. No zone → run aborts ([`crate::Error::ZoneNotFound`])
//! 3. Submission fails → logged as a warning, run still completes

use crate::address::resolve_address;
use crate::config::RegistrarConfig;
use crate::domain::DomainName;
use crate::error::Result;
use crate::record::ChangeSet;
use crate::traits::{ChangeInfo, DnsProvider, HostedZone, MetadataSource};
use crate::zone::resolve_zone;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events emitted by the Registrar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    /// Run started
    Started { host: String },

    /// Address to publish determined
    AddressResolved { address: Ipv4Addr },

    /// Target zone determined
    ZoneResolved { zone_id: String, zone_name: String },

    /// Change accepted by the provider
    ChangeSubmitted { change_id: String, status: String },

    /// Change not submitted (dry run)
    ChangeSkipped { change: ChangeSet },

    /// Change rejected or request failed
    ChangeFailed { error: String },
}

/// Result of a completed registration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    /// The registered host
    pub host: DomainName,
    /// The published address
    pub address: Ipv4Addr,
    /// The zone the record was submitted to
    pub zone: HostedZone,
    /// The submitted change set
    pub change_set: ChangeSet,
    /// Provider receipt, `None` when the submission failed or was skipped
    pub change: Option<ChangeInfo>,
}

/// Registration orchestrator
///
/// Runs the address → zone → change set → submit sequence strictly in
/// order, one blocking step after another. Holds the provider client for
/// the whole run so it is constructed exactly once.
pub struct Registrar {
    /// Metadata source for the instance's address
    metadata: Box<dyn MetadataSource>,

    /// DNS provider for zone lookup and change submission
    provider: Box<dyn DnsProvider>,

    /// Build the change set but do not submit it
    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<RegistrationEvent>,
}

impl Registrar {
    /// Create a new Registrar
    ///
    /// # Parameters
    ///
    /// - `metadata`: Metadata source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: Registrar configuration
    ///
    /// # Returns
    ///
    /// A tuple of (registrar, event_receiver) where event_receiver yields registration events
    pub fn new(
        metadata: Box<dyn MetadataSource>,
        provider: Box<dyn DnsProvider>,
        config: &RegistrarConfig,
    ) -> Result<(Self, mpsc::Receiver<RegistrationEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.options.event_channel_capacity);

        let registrar = Self {
            metadata,
            provider,
            dry_run: config.options.dry_run,
            event_tx: tx,
        };

        Ok((registrar, rx))
    }

    /// Register `host` at this instance's address
    ///
    /// # Returns
    ///
    /// - `Ok(RegistrationOutcome)`: The run completed (the change itself
    ///   may still have failed, see [`RegistrationOutcome::change`])
    /// - `Err(Error)`: Invalid host, no address, or no zone
    pub async fn register(&self, host: &str) -> Result<RegistrationOutcome> {
        let host = DomainName::parse(host)?;

        self.emit_event(RegistrationEvent::Started {
            host: host.to_string(),
        });

        let address = resolve_address(self.metadata.as_ref()).await?;
        info!("Got IP: {}", address);
        self.emit_event(RegistrationEvent::AddressResolved { address });

        let zone = resolve_zone(&host, self.provider.as_ref()).await?;
        self.emit_event(RegistrationEvent::ZoneResolved {
            zone_id: zone.id.clone(),
            zone_name: zone.name.to_string(),
        });

        let change_set = ChangeSet::upsert_a(host.as_str(), address.to_string());
        debug!("Change set for zone {}: {}", zone, change_set);

        let change = if self.dry_run {
            info!(
                "[DRY-RUN] Would submit to {} zone {}: {}",
                self.provider.provider_name(),
                zone,
                change_set
            );
            self.emit_event(RegistrationEvent::ChangeSkipped {
                change: change_set.clone(),
            });
            None
        } else {
            self.submit(&change_set, &zone).await
        };

        Ok(RegistrationOutcome {
            host,
            address,
            zone,
            change_set,
            change,
        })
    }

    /// Submit the change set once, reporting but absorbing failure
    async fn submit(&self, change_set: &ChangeSet, zone: &HostedZone) -> Option<ChangeInfo> {
        match self.provider.submit_change(change_set, &zone.id).await {
            Ok(change) => {
                info!("ChangeResult: {:?}", change);
                self.emit_event(RegistrationEvent::ChangeSubmitted {
                    change_id: change.id.clone(),
                    status: change.status.to_string(),
                });
                Some(change)
            }
            Err(e) => {
                warn!("Change request failed: {}", e);
                self.emit_event(RegistrationEvent::ChangeFailed {
                    error: e.to_string(),
                });
                None
            }
        }
    }

    /// Emit a registration event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: RegistrationEvent) {
        // A full or closed channel only loses monitoring data, never the run.
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, event discarded");
            }
        }
    }
}
