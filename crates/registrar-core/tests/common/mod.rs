//! Test doubles and common utilities for registrar contract tests
//!
//! These doubles stand in for the metadata service and the DNS provider
//! and record every call so tests can assert on ordering and counts.

#![allow(dead_code)]

use registrar_core::config::{ProviderConfig, RegistrarConfig};
use registrar_core::error::{Error, Result};
use registrar_core::traits::{
    ChangeInfo, ChangeStatus, ChangeSubmitter, DnsProvider, HostedZone, MetadataSource,
    ZoneLookup,
};
use registrar_core::{ChangeSet, DomainName};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the mock answers a by-name lookup for one name
#[derive(Debug, Clone)]
pub enum ZoneAnswer {
    /// Exactly one zone with the queried name
    Exact,
    /// No zones
    Empty,
    /// `n` zones with the queried name
    Ambiguous(usize),
    /// One zone, but for another name
    NearMatch(&'static str),
    /// The query fails
    Fail,
}

/// A ZoneLookup backed by a table of answers
///
/// Any name not in the table fails with "not found", which is how the
/// original registrar's test double behaved.
#[derive(Clone, Default)]
pub struct MockZoneLookup {
    answers: Arc<Mutex<HashMap<String, ZoneAnswer>>>,
    queries: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockZoneLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A lookup that knows exactly the given zones
    pub fn with_zones(zones: &[&str]) -> Self {
        let lookup = Self::new();
        for zone in zones {
            lookup.answer(zone, ZoneAnswer::Exact);
        }
        lookup
    }

    /// Set the answer for one name
    pub fn answer(&self, name: &str, answer: ZoneAnswer) -> &Self {
        self.answers
            .lock()
            .unwrap()
            .insert(name.to_string(), answer);
        self
    }

    /// Names queried, in order
    pub fn queried_names(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// `max_items` values passed, in order
    pub fn max_items_requested(&self) -> Vec<usize> {
        self.queries.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }
}

/// Zone ID the mocks assign to a zone name
pub fn zone_id_for(name: &str) -> String {
    format!("/hostedzone/Z-{}", name.replace('.', "-").to_uppercase())
}

fn zone(name: &str) -> HostedZone {
    HostedZone::new(zone_id_for(name), DomainName::parse(name).unwrap())
}

#[async_trait::async_trait]
impl ZoneLookup for MockZoneLookup {
    async fn list_zones_by_name(&self, name: &str, max_items: usize) -> Result<Vec<HostedZone>> {
        self.queries
            .lock()
            .unwrap()
            .push((name.to_string(), max_items));

        let answer = self.answers.lock().unwrap().get(name).cloned();

        match answer {
            Some(ZoneAnswer::Exact) => Ok(vec![zone(name)]),
            Some(ZoneAnswer::Empty) => Ok(Vec::new()),
            Some(ZoneAnswer::Ambiguous(n)) => Ok((0..n).map(|_| zone(name)).collect()),
            Some(ZoneAnswer::NearMatch(other)) => Ok(vec![zone(other)]),
            Some(ZoneAnswer::Fail) => Err(Error::rate_limited("Throttling")),
            None => Err(Error::not_found(format!("not found, got {}", name))),
        }
    }
}

/// A DnsProvider combining a MockZoneLookup with a recording submitter
#[derive(Clone)]
pub struct MockDnsProvider {
    pub lookup: MockZoneLookup,
    submissions: Arc<Mutex<Vec<(ChangeSet, String)>>>,
    fail_submission: bool,
}

impl MockDnsProvider {
    pub fn new(lookup: MockZoneLookup) -> Self {
        Self {
            lookup,
            submissions: Arc::new(Mutex::new(Vec::new())),
            fail_submission: false,
        }
    }

    /// Make every submission fail
    pub fn failing_submissions(mut self) -> Self {
        self.fail_submission = true;
        self
    }

    /// Change sets submitted, with their zone IDs
    pub fn submissions(&self) -> Vec<(ChangeSet, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ZoneLookup for MockDnsProvider {
    async fn list_zones_by_name(&self, name: &str, max_items: usize) -> Result<Vec<HostedZone>> {
        self.lookup.list_zones_by_name(name, max_items).await
    }
}

#[async_trait::async_trait]
impl ChangeSubmitter for MockDnsProvider {
    async fn submit_change(&self, change_set: &ChangeSet, zone_id: &str) -> Result<ChangeInfo> {
        self.submissions
            .lock()
            .unwrap()
            .push((change_set.clone(), zone_id.to_string()));

        if self.fail_submission {
            return Err(Error::provider("mock", "InvalidChangeBatch"));
        }

        Ok(ChangeInfo {
            id: "/change/C-TEST".to_string(),
            status: ChangeStatus::Pending,
            submitted_at: Some("2024-01-01T00:00:00.000Z".to_string()),
        })
    }
}

impl DnsProvider for MockDnsProvider {
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A MetadataSource with scripted attribute answers
#[derive(Clone)]
pub struct MockMetadataSource {
    available: bool,
    attributes: Arc<HashMap<String, Option<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    available_calls: Arc<AtomicUsize>,
}

impl MockMetadataSource {
    /// A source that reports itself unavailable
    pub fn unavailable() -> Self {
        Self {
            available: false,
            attributes: Arc::new(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            available_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// An available source; `None` for an attribute means the query fails
    pub fn with_attributes(public: Option<&str>, local: Option<&str>) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert("/public-ipv4".to_string(), public.map(str::to_string));
        attributes.insert("/local-ipv4".to_string(), local.map(str::to_string));

        Self {
            available: true,
            attributes: Arc::new(attributes),
            calls: Arc::new(Mutex::new(Vec::new())),
            available_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Paths queried, in order
    pub fn queried_paths(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of availability checks
    pub fn available_call_count(&self) -> usize {
        self.available_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MetadataSource for MockMetadataSource {
    async fn available(&self) -> bool {
        self.available_calls.fetch_add(1, Ordering::SeqCst);
        self.available
    }

    async fn get_metadata(&self, path: &str) -> Result<String> {
        self.calls.lock().unwrap().push(path.to_string());

        match self.attributes.get(path) {
            Some(Some(value)) => Ok(value.clone()),
            _ => Err(Error::metadata(format!("{} returned 404", path))),
        }
    }

    fn source_name(&self) -> &'static str {
        "mock-metadata"
    }
}

/// Helper to create a minimal RegistrarConfig for testing
pub fn minimal_config() -> RegistrarConfig {
    RegistrarConfig::new(ProviderConfig::Route53 {
        access_key_id: Some("AKIDEXAMPLE".to_string()),
        secret_access_key: Some("test-secret".to_string()),
        session_token: None,
        profile: None,
        credentials_file: None,
        imds_endpoint: None,
        endpoint: None,
    })
}

/// The zones registered in the reference scenario
pub const REFERENCE_ZONES: &[&str] = &["bar.com", "foo.bar.com", "beep.florp.com"];
