// # IMDS Metadata Source
//
// This crate provides the EC2 Instance Metadata Service implementation of
// the registrar's `MetadataSource` capability.
//
// ## Protocol
//
// IMDSv2 first: a session token is requested once with
// `PUT /latest/api/token` and sent on every metadata read. If the token
// request fails the source degrades to IMDSv1 and reads without it.
//
// ## Not a Retrying Client
//
// Every read is a single request with a short timeout. Off-instance the
// link-local address is unreachable, which `available()` reports quickly.

use registrar_core::ProviderRegistry;
use registrar_core::config::MetadataConfig;
use registrar_core::traits::{MetadataSource, MetadataSourceFactory};
use registrar_core::{Error, Result};

use std::time::Duration;

use tokio::sync::Mutex;

/// Link-local IMDS address
pub const IMDS_ENDPOINT: &str = "http://169.254.169.254";

const TOKEN_PATH: &str = "/latest/api/token";
const METADATA_ROOT: &str = "/latest/meta-data";

/// Attribute read to decide availability
const AVAILABILITY_PATH: &str = "/instance-id";

const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Requested session token lifetime (6 hours)
const TOKEN_TTL_SECS: &str = "21600";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Session token state
#[derive(Debug, Clone)]
enum Session {
    /// No token requested yet
    Unknown,
    /// IMDSv2 token
    Token(String),
    /// Token request failed; read without one
    V1,
}

/// EC2 Instance Metadata Service source
pub struct ImdsMetadataSource {
    /// Base URL, without a trailing slash
    endpoint: String,

    session: Mutex<Session>,

    client: reqwest::Client,
}

impl ImdsMetadataSource {
    /// Create a new IMDS source
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Optional endpoint override; defaults to [`IMDS_ENDPOINT`]
    /// - `timeout`: Per-request timeout
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint
            .as_deref()
            .unwrap_or(IMDS_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            session: Mutex::new(Session::Unknown),
            client,
        })
    }

    /// Get the session token, requesting one on first use
    async fn session_token(&self) -> Option<String> {
        let mut session = self.session.lock().await;

        match &*session {
            Session::Token(token) => return Some(token.clone()),
            Session::V1 => return None,
            Session::Unknown => {}
        }

        match self.request_token().await {
            Ok(token) => {
                tracing::debug!("Obtained IMDSv2 session token");
                *session = Session::Token(token.clone());
                Some(token)
            }
            Err(e) => {
                tracing::debug!("IMDSv2 token unavailable, falling back to IMDSv1: {}", e);
                *session = Session::V1;
                None
            }
        }
    }

    async fn request_token(&self) -> Result<String> {
        let url = format!("{}{}", self.endpoint, TOKEN_PATH);

        let response = self
            .client
            .put(&url)
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECS)
            .send()
            .await
            .map_err(|e| Error::metadata(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::metadata(format!(
                "Token request returned {}",
                response.status()
            )));
        }

        let token = response
            .text()
            .await
            .map_err(|e| Error::metadata(format!("Failed to read token: {}", e)))?;

        Ok(token.trim().to_string())
    }
}

#[async_trait::async_trait]
impl MetadataSource for ImdsMetadataSource {
    async fn available(&self) -> bool {
        match self.get_metadata(AVAILABILITY_PATH).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Instance metadata unavailable: {}", e);
                false
            }
        }
    }

    async fn get_metadata(&self, path: &str) -> Result<String> {
        let url = format!("{}{}{}", self.endpoint, METADATA_ROOT, path);

        let mut request = self.client.get(&url);
        if let Some(token) = self.session_token().await {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::metadata(format!("Request for {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(Error::metadata(format!(
                "Request for {} returned {}",
                path,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::metadata(format!("Failed to read {}: {}", path, e)))
    }

    fn source_name(&self) -> &'static str {
        "imds"
    }
}

/// Factory for creating IMDS metadata sources
pub struct ImdsFactory;

impl MetadataSourceFactory for ImdsFactory {
    fn create(&self, config: &MetadataConfig) -> Result<Box<dyn MetadataSource>> {
        match config {
            MetadataConfig::Imds {
                endpoint,
                timeout_secs,
            } => {
                config.validate()?;

                Ok(Box::new(ImdsMetadataSource::new(
                    endpoint.clone(),
                    Duration::from_secs(*timeout_secs),
                )?))
            }
        }
    }
}

/// Register the IMDS metadata source with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_metadata_source("imds", Box::new(ImdsFactory));
}
