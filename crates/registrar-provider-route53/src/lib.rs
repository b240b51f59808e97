// # Amazon Route 53 DNS Provider
//
// This crate provides the Route 53 implementation of the registrar's
// `ZoneLookup` and `ChangeSubmitter` capabilities, speaking the REST/XML
// API directly and signing every request with SigV4.
//
// ## Trust Level: Untrusted (DNS Provider)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTPS API calls to the configured Route 53 endpoint only
// - ✅ Parse Route 53 responses
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads
// - ❌ Implement retry logic (one request per call)
// - ❌ Decide which zone a host belongs to (owned by the zone resolver)
//
// ## Security Requirements
//
// - The secret access key and session token NEVER appear in logs
// - Credentials come from the chain in `credentials`: environment, then the
//   shared credentials file, then the instance role
//
// ## API Reference
//
// - List zones: GET `/2013-04-01/hostedzonesbyname?dnsname=...&maxitems=...`
// - Change records: POST `/2013-04-01/hostedzone/{Id}/rrset/`

pub mod credentials;
pub mod sigv4;
pub mod xml;

pub use credentials::{AwsCredentials, CredentialChain};

use async_trait::async_trait;
use registrar_core::config::ProviderConfig;
use registrar_core::traits::{
    ChangeInfo, ChangeStatus, ChangeSubmitter, DnsProvider, DnsProviderFactory, HostedZone,
    ZoneLookup, bare_zone_id,
};
use registrar_core::{ChangeSet, DomainName, Error, Result};
use registrar_metadata_imds::ImdsMetadataSource;
use reqwest::{Method, Url};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Public Route 53 endpoint
pub const ROUTE53_ENDPOINT: &str = "https://route53.amazonaws.com";

/// REST API version path segment
const API_VERSION: &str = "2013-04-01";

/// Route 53 is a global service signed in us-east-1
const SIGNING_REGION: &str = "us-east-1";
const SIGNING_SERVICE: &str = "route53";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for instance-role credential reads
const INSTANCE_ROLE_TIMEOUT: Duration = Duration::from_secs(2);

const PROVIDER_NAME: &str = "route53";

/// Route 53 DNS provider
///
/// # Trust Level: Untrusted
///
/// Single-shot: each trait call makes exactly one signed HTTP request and
/// reports its result. Credentials are resolved once, on the first request.
pub struct Route53Provider {
    chain: CredentialChain,

    /// Outcome of the first resolution; `None` when no source had credentials
    credentials: OnceCell<Option<AwsCredentials>>,

    /// Base URL, without a trailing slash
    endpoint: String,

    /// `host[:port]` of the endpoint, as signed
    host: String,

    client: reqwest::Client,
}

impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("chain", &self.chain)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Route53Provider {
    /// Create a new Route 53 provider with a fixed key pair
    ///
    /// # Parameters
    ///
    /// - `credentials`: Access key pair (and optional session token)
    /// - `endpoint`: Optional endpoint override; defaults to [`ROUTE53_ENDPOINT`]
    pub fn new(credentials: AwsCredentials, endpoint: Option<String>) -> Result<Self> {
        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(Error::config("Route 53 credentials cannot be empty"));
        }

        Self::with_credential_chain(CredentialChain::new().with_static(credentials), endpoint)
    }

    /// Create a new Route 53 provider that resolves credentials from `chain`
    pub fn with_credential_chain(chain: CredentialChain, endpoint: Option<String>) -> Result<Self> {
        let endpoint = endpoint
            .as_deref()
            .unwrap_or(ROUTE53_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        let url = Url::parse(&endpoint)
            .map_err(|e| Error::config(format!("Invalid Route 53 endpoint '{}': {}", endpoint, e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::config(format!(
                    "Route 53 endpoint '{}' has no host",
                    endpoint
                )));
            }
        };

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            chain,
            credentials: OnceCell::new(),
            endpoint,
            host,
            client,
        })
    }

    /// Credentials for signing, resolved through the chain on first use
    async fn credentials(&self) -> Result<&AwsCredentials> {
        self.credentials
            .get_or_init(|| self.chain.resolve())
            .await
            .as_ref()
            .ok_or_else(|| {
                Error::auth(
                    "No AWS credentials found in the environment, \
                    the shared credentials file or the instance role",
                )
            })
    }

    /// Send one signed request and return the response body
    ///
    /// Non-2xx responses are mapped through [`map_error`].
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<String> {
        let credentials = self.credentials().await?;

        let query_string = sigv4::canonical_query(query);
        let url = if query_string.is_empty() {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}{}?{}", self.endpoint, path, query_string)
        };
        let signed_path = Url::parse(&url)
            .map_err(|e| Error::http(format!("Invalid request URL: {}", e)))?
            .path()
            .to_string();

        let payload = body.as_deref().unwrap_or_default();
        let amz_date = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers: Vec<(&str, &str)> = vec![
            ("host", self.host.as_str()),
            ("x-amz-date", amz_date.as_str()),
        ];
        if let Some(token) = credentials.session_token.as_deref() {
            headers.push(("x-amz-security-token", token));
        }

        let authorization = sigv4::authorization(
            &sigv4::SignableRequest {
                method: method.as_str(),
                path: &signed_path,
                query,
                headers: &headers,
                payload: payload.as_bytes(),
            },
            &sigv4::SigningParams {
                access_key_id: &credentials.access_key_id,
                secret_access_key: &credentials.secret_access_key,
                region: SIGNING_REGION,
                service: SIGNING_SERVICE,
            },
            &amz_date,
        );

        tracing::debug!("Route 53 request: {} {}", method, signed_path);

        let mut request = self
            .client
            .request(method, &url)
            .header("authorization", authorization);
        for (name, value) in &headers {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request.header("content-type", "application/xml").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        if !status.is_success() {
            return Err(map_error(status.as_u16(), &text));
        }

        Ok(text)
    }
}

/// Map a failed Route 53 response to a registrar error
///
/// - 400 with `Throttling`, or 429 → rate limited
/// - 401 / 403 → authentication
/// - 404 → not found
/// - 5xx → transient provider error
/// - anything else → provider error carrying the API error code
pub fn map_error(status: u16, body: &str) -> Error {
    let api_error = xml::parse_error(body);
    let detail = match &api_error {
        Some(e) => format!("{}: {}", e.code, e.message),
        None => format!("{} - {}", status, body.trim()),
    };

    match status {
        401 | 403 => Error::auth(format!(
            "Route 53 rejected the credentials or lacks permission ({})",
            detail
        )),
        404 => Error::not_found(detail),
        429 => Error::rate_limited(detail),
        400 if api_error.as_ref().is_some_and(|e| e.code == "Throttling") => {
            Error::rate_limited(detail)
        }
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("Route 53 server error (transient): {}", detail),
        ),
        _ => Error::provider(PROVIDER_NAME, detail),
    }
}

#[async_trait]
impl ZoneLookup for Route53Provider {
    /// # API Call
    ///
    /// ```http
    /// GET /2013-04-01/hostedzonesbyname?dnsname=bar.com&maxitems=1
    /// ```
    async fn list_zones_by_name(&self, name: &str, max_items: usize) -> Result<Vec<HostedZone>> {
        let max_items = max_items.to_string();
        let path = format!("/{API_VERSION}/hostedzonesbyname");

        let body = self
            .send(
                Method::GET,
                &path,
                &[("dnsname", name), ("maxitems", &max_items)],
                None,
            )
            .await?;

        xml::parse_hosted_zones(&body)?
            .into_iter()
            .map(|entry| {
                let name = DomainName::parse(&entry.name).map_err(|e| {
                    Error::provider(
                        PROVIDER_NAME,
                        format!("Hosted zone {} has an invalid name: {}", entry.id, e),
                    )
                })?;
                Ok(HostedZone::new(entry.id, name))
            })
            .collect()
    }
}

#[async_trait]
impl ChangeSubmitter for Route53Provider {
    /// # API Call
    ///
    /// ```http
    /// POST /2013-04-01/hostedzone/Z123/rrset/
    /// <ChangeResourceRecordSetsRequest>...</ChangeResourceRecordSetsRequest>
    /// ```
    async fn submit_change(&self, change_set: &ChangeSet, zone_id: &str) -> Result<ChangeInfo> {
        let path = format!("/{API_VERSION}/hostedzone/{}/rrset/", bare_zone_id(zone_id));
        let body = xml::change_request_body(change_set)?;

        tracing::info!("Submitting to Route 53 zone {}: {}", bare_zone_id(zone_id), change_set);

        let response = self.send(Method::POST, &path, &[], Some(body)).await?;
        let info = xml::parse_change_info(&response)?;

        Ok(ChangeInfo {
            id: info.id,
            status: ChangeStatus::from(info.status.as_str()),
            submitted_at: info.submitted_at,
        })
    }
}

impl DnsProvider for Route53Provider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Route 53 providers
pub struct Route53Factory;

impl DnsProviderFactory for Route53Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                session_token,
                profile,
                credentials_file,
                imds_endpoint,
                endpoint,
            } => {
                config.validate()?;

                let mut chain = CredentialChain::new();
                if let (Some(key), Some(secret)) = (access_key_id, secret_access_key) {
                    chain = chain.with_static(AwsCredentials::new(
                        key.clone(),
                        secret.clone(),
                        session_token.clone(),
                    ));
                }

                let file = credentials_file
                    .as_ref()
                    .map(std::path::PathBuf::from)
                    .or_else(credentials::default_credentials_file);
                if let Some(file) = file {
                    chain = chain.with_profile_file(
                        file,
                        profile.as_deref().unwrap_or(credentials::DEFAULT_PROFILE),
                    );
                }

                let imds = ImdsMetadataSource::new(imds_endpoint.clone(), INSTANCE_ROLE_TIMEOUT)?;
                chain = chain.with_instance_role(Box::new(imds));

                Ok(Box::new(Route53Provider::with_credential_chain(
                    chain,
                    endpoint.clone(),
                )?))
            }
        }
    }
}

/// Register the Route 53 provider with a registry
///
/// # Example
///
/// ```rust
/// use registrar_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// registrar_provider_route53::register(&registry);
/// assert!(registry.has_provider("route53"));
/// ```
pub fn register(registry: &registrar_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(Route53Factory));
}
