//! Configuration types for the registrar
//!
//! This module defines all configuration structures used throughout the crate.
//! Loading them (from the environment) is the binary's job.

use serde::{Deserialize, Serialize};

/// Main registrar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Metadata source configuration
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Optional run settings
    #[serde(default)]
    pub options: RunOptions,
}

impl RegistrarConfig {
    /// Create a new configuration for the given provider with defaults
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            metadata: MetadataConfig::default(),
            options: RunOptions::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.metadata.validate()?;

        if self.options.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Amazon Route 53
    ///
    /// Static keys are optional. Without them the provider falls back to
    /// the shared credentials file and then to the instance role.
    Route53 {
        /// AWS access key ID
        #[serde(default)]
        access_key_id: Option<String>,
        /// AWS secret access key
        #[serde(default)]
        secret_access_key: Option<String>,
        /// Session token for temporary credentials
        #[serde(default)]
        session_token: Option<String>,
        /// Profile to read from the shared credentials file
        #[serde(default)]
        profile: Option<String>,
        /// Path of the shared credentials file
        #[serde(default)]
        credentials_file: Option<String>,
        /// Instance metadata endpoint used for instance-role credentials
        #[serde(default)]
        imds_endpoint: Option<String>,
        /// API endpoint override (defaults to the public Route 53 endpoint)
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                imds_endpoint,
                endpoint,
                ..
            } => {
                match (access_key_id.as_deref(), secret_access_key.as_deref()) {
                    (None, None) => {}
                    (Some(""), _) => {
                        return Err(crate::Error::config("Route 53 access key ID cannot be empty"));
                    }
                    (_, Some("")) => {
                        return Err(crate::Error::config(
                            "Route 53 secret access key cannot be empty",
                        ));
                    }
                    (Some(_), None) | (None, Some(_)) => {
                        return Err(crate::Error::config(
                            "Route 53 access key ID and secret access key must be set together",
                        ));
                    }
                    (Some(_), Some(_)) => {}
                }
                validate_endpoint(imds_endpoint.as_deref(), "IMDS endpoint")?;
                validate_endpoint(endpoint.as_deref(), "Route 53 endpoint")
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Route53 { .. } => "route53",
        }
    }
}

// Credentials must never reach logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                session_token,
                profile,
                credentials_file,
                imds_endpoint,
                endpoint,
            } => f
                .debug_struct("Route53")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &secret_access_key.as_ref().map(|_| "<REDACTED>"))
                .field("session_token", &session_token.as_ref().map(|_| "<REDACTED>"))
                .field("profile", profile)
                .field("credentials_file", credentials_file)
                .field("imds_endpoint", imds_endpoint)
                .field("endpoint", endpoint)
                .finish(),
        }
    }
}

/// Metadata source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetadataConfig {
    /// EC2 Instance Metadata Service
    Imds {
        /// Endpoint override (defaults to the link-local IMDS address)
        #[serde(default)]
        endpoint: Option<String>,
        /// Per-request timeout in seconds
        #[serde(default = "default_metadata_timeout_secs")]
        timeout_secs: u64,
    },
}

impl MetadataConfig {
    /// Validate the metadata source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            MetadataConfig::Imds {
                endpoint,
                timeout_secs,
            } => {
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("IMDS timeout must be > 0"));
                }
                validate_endpoint(endpoint.as_deref(), "IMDS endpoint")
            }
        }
    }

    /// Get the metadata source type name
    pub fn type_name(&self) -> &str {
        match self {
            MetadataConfig::Imds { .. } => "imds",
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        MetadataConfig::Imds {
            endpoint: None,
            timeout_secs: default_metadata_timeout_secs(),
        }
    }
}

/// Settings for a single registration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Build and log the change set but do not submit it
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the registration event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn validate_endpoint(endpoint: Option<&str>, what: &str) -> Result<(), crate::Error> {
    match endpoint {
        Some(url) if !url.starts_with("https://") && !url.starts_with("http://") => Err(
            crate::Error::config(format!("{} must use HTTP or HTTPS scheme. Got: {}", what, url)),
        ),
        _ => Ok(()),
    }
}

fn default_metadata_timeout_secs() -> u64 {
    2
}

fn default_event_channel_capacity() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route53(key: Option<&str>, secret: Option<&str>) -> ProviderConfig {
        ProviderConfig::Route53 {
            access_key_id: key.map(str::to_string),
            secret_access_key: secret.map(str::to_string),
            session_token: None,
            profile: None,
            credentials_file: None,
            imds_endpoint: None,
            endpoint: None,
        }
    }

    #[test]
    fn test_valid_config() {
        let config = RegistrarConfig::new(route53(Some("AKIDEXAMPLE"), Some("secret")));
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.type_name(), "route53");
        assert_eq!(config.metadata.type_name(), "imds");
    }

    #[test]
    fn test_static_keys_are_optional() {
        assert!(RegistrarConfig::new(route53(None, None)).validate().is_ok());
    }

    #[test]
    fn test_partial_or_empty_keys_rejected() {
        assert!(RegistrarConfig::new(route53(Some(""), Some("secret"))).validate().is_err());
        assert!(RegistrarConfig::new(route53(Some("AKIDEXAMPLE"), Some(""))).validate().is_err());
        assert!(RegistrarConfig::new(route53(Some("AKIDEXAMPLE"), None)).validate().is_err());
        assert!(RegistrarConfig::new(route53(None, Some("secret"))).validate().is_err());
    }

    #[test]
    fn test_endpoint_scheme_checked() {
        let provider = ProviderConfig::Route53 {
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            profile: None,
            credentials_file: None,
            imds_endpoint: None,
            endpoint: Some("route53.example.test".to_string()),
        };
        assert!(provider.validate().is_err());

        let provider = ProviderConfig::Route53 {
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            profile: None,
            credentials_file: None,
            imds_endpoint: Some("169.254.169.254".to_string()),
            endpoint: None,
        };
        assert!(provider.validate().is_err());

        let metadata = MetadataConfig::Imds {
            endpoint: Some("ftp://169.254.169.254".to_string()),
            timeout_secs: 2,
        };
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_deserialize_without_keys() {
        let provider: ProviderConfig =
            serde_json::from_str(r#"{"type":"route53","profile":"dns"}"#).unwrap();

        match provider {
            ProviderConfig::Route53 {
                access_key_id,
                profile,
                ..
            } => {
                assert!(access_key_id.is_none());
                assert_eq!(profile.as_deref(), Some("dns"));
            }
        }
    }

    #[test]
    fn test_zero_channel_capacity_rejected() {
        let mut config = RegistrarConfig::new(route53(Some("AKIDEXAMPLE"), Some("secret")));
        config.options.event_channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let provider = ProviderConfig::Route53 {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("very-secret-key".to_string()),
            session_token: Some("very-secret-token".to_string()),
            profile: None,
            credentials_file: None,
            imds_endpoint: None,
            endpoint: None,
        };

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("very-secret"));
        assert!(debug_str.contains("AKIDEXAMPLE"));
    }
}
