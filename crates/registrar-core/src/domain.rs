//! Domain names as ordered label sequences
//!
//! A [`DomainName`] is never empty and never carries a trailing dot.
//! Providers frequently return fully-qualified names (`"bar.com."`);
//! parsing normalizes those so that names from the command line and
//! names from a provider compare equal.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label delimiter
pub const LABEL_DELIMITER: char = '.';

/// A non-empty domain name without a trailing delimiter
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Parse a domain name, dropping a single trailing dot
    ///
    /// Labels are not validated beyond the name being non-empty.
    pub fn parse(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let trimmed = trimmed.strip_suffix(LABEL_DELIMITER).unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Err(Error::invalid_input(format!(
                "Domain name cannot be empty: '{}'",
                name
            )));
        }

        if trimmed.ends_with(LABEL_DELIMITER) {
            return Err(Error::invalid_input(format!(
                "Domain name has a trailing empty label: '{}'",
                name
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Labels from leftmost (most specific) to rightmost
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split(LABEL_DELIMITER)
    }

    /// Number of labels
    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// The name with its leftmost label stripped
    ///
    /// Returns `None` when only one label remains, since stripping it
    /// would leave an empty name.
    pub fn parent(&self) -> Option<DomainName> {
        self.0
            .split_once(LABEL_DELIMITER)
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
            .map(|rest| DomainName(rest.to_string()))
    }
}

impl PartialEq for DomainName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}
