//! Record builder
//!
//! Builds the single-record change set submitted at the end of a
//! registration run. Construction is pure: names and values pass through
//! exactly as given.

use serde::{Deserialize, Serialize};
use std::fmt;

/// TTL applied to every registered record, in seconds
pub const DEFAULT_TTL: u32 = 60;

/// Change action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create the record if absent, overwrite it if present
    Upsert,
}

impl ChangeAction {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource record set as submitted to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecordSet {
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Record values
    pub values: Vec<String>,
}

/// A single pending mutation for one registration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// What to do with the record
    pub action: ChangeAction,
    /// The record itself
    pub record: ResourceRecordSet,
}

impl ChangeSet {
    /// Build an UPSERT of an A record pointing `name` at `address`
    pub fn upsert_a(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::Upsert,
            record: ResourceRecordSet {
                name: name.into(),
                record_type: RecordType::A,
                ttl: DEFAULT_TTL,
                values: vec![address.into()],
            },
        }
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ttl={} [{}]",
            self.action,
            self.record.record_type,
            self.record.name,
            self.record.ttl,
            self.record.values.join(", ")
        )
    }
}
