// # AWS Credential Chain
//
// Resolves the key pair used to sign Route 53 requests. Sources are tried
// in order and the first one that yields a complete key pair wins:
//
// 1. Static keys (from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`)
// 2. The shared credentials file (`~/.aws/credentials`, profile from `AWS_PROFILE`)
// 3. The instance role, read from the metadata service at
//    `/latest/meta-data/iam/security-credentials/<role>`
//
// A source that is absent or broken is logged at DEBUG and skipped.

use registrar_core::traits::MetadataSource;
use registrar_core::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Profile used when none is configured
pub const DEFAULT_PROFILE: &str = "default";

/// Metadata path listing the instance's IAM role
pub const ROLE_CREDENTIALS_PATH: &str = "/iam/security-credentials/";

/// AWS credentials used to sign requests
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// A profile in a shared credentials file
#[derive(Debug, Clone)]
struct ProfileFile {
    path: PathBuf,
    profile: String,
}

/// Ordered credential sources
#[derive(Default)]
pub struct CredentialChain {
    static_credentials: Option<AwsCredentials>,
    profile_file: Option<ProfileFile>,
    instance_role: Option<Box<dyn MetadataSource>>,
}

impl std::fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialChain")
            .field("static_credentials", &self.static_credentials)
            .field("profile_file", &self.profile_file)
            .field(
                "instance_role",
                &self.instance_role.as_ref().map(|s| s.source_name()),
            )
            .finish()
    }
}

impl CredentialChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed key pair; it takes precedence over every other source
    pub fn with_static(mut self, credentials: AwsCredentials) -> Self {
        self.static_credentials = Some(credentials);
        self
    }

    /// Read `profile` from the shared credentials file at `path`
    pub fn with_profile_file(mut self, path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        self.profile_file = Some(ProfileFile {
            path: path.into(),
            profile: profile.into(),
        });
        self
    }

    /// Fall back to the instance role published by `source`
    pub fn with_instance_role(mut self, source: Box<dyn MetadataSource>) -> Self {
        self.instance_role = Some(source);
        self
    }

    /// Resolve credentials from the first source that has them
    ///
    /// Returns `None` when every source came up empty.
    pub async fn resolve(&self) -> Option<AwsCredentials> {
        if let Some(credentials) = &self.static_credentials {
            tracing::debug!("Using AWS credentials from the environment");
            return Some(credentials.clone());
        }

        if let Some(file) = &self.profile_file {
            match load_profile(&file.path, &file.profile).await {
                Ok(Some(credentials)) => {
                    tracing::info!(
                        "Using AWS credentials from profile '{}' in {}",
                        file.profile,
                        file.path.display()
                    );
                    return Some(credentials);
                }
                Ok(None) => tracing::debug!(
                    "Profile '{}' in {} has no access key pair",
                    file.profile,
                    file.path.display()
                ),
                Err(e) => tracing::debug!("Shared credentials file skipped: {}", e),
            }
        }

        if let Some(source) = &self.instance_role {
            match instance_role_credentials(source.as_ref()).await {
                Ok(credentials) => return Some(credentials),
                Err(e) => tracing::debug!("Instance role credentials unavailable: {}", e),
            }
        }

        None
    }
}

async fn load_profile(path: &Path, profile: &str) -> Result<Option<AwsCredentials>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::config(format!("Cannot read {}: {}", path.display(), e)))?;

    Ok(parse_profile(&contents, profile))
}

/// Extract one profile's key pair from shared credentials file contents
///
/// Sections are `[name]`; keys are `aws_access_key_id`,
/// `aws_secret_access_key` and the optional `aws_session_token`.
pub fn parse_profile(contents: &str, profile: &str) -> Option<AwsCredentials> {
    let mut in_profile = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut session_token = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }

        if !in_profile {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match key.trim().to_ascii_lowercase().as_str() {
            "aws_access_key_id" => access_key_id = value,
            "aws_secret_access_key" => secret_access_key = value,
            "aws_session_token" => session_token = value,
            _ => {}
        }
    }

    Some(AwsCredentials::new(access_key_id?, secret_access_key?, session_token))
}

/// Security credentials document served for an instance role
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RoleCredentials {
    code: String,
    access_key_id: String,
    secret_access_key: String,
    token: Option<String>,
    expiration: Option<String>,
}

async fn instance_role_credentials(source: &dyn MetadataSource) -> Result<AwsCredentials> {
    let roles = source.get_metadata(ROLE_CREDENTIALS_PATH).await?;
    let role = roles
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| Error::auth("No IAM role is attached to this instance"))?;

    let body = source
        .get_metadata(&format!("{ROLE_CREDENTIALS_PATH}{role}"))
        .await?;
    let document: RoleCredentials = serde_json::from_str(&body)
        .map_err(|e| Error::auth(format!("Malformed credentials for role {}: {}", role, e)))?;

    if document.code != "Success" {
        return Err(Error::auth(format!(
            "Credentials for role {} are not available: {}",
            role, document.code
        )));
    }

    tracing::info!(
        "Using credentials of instance role {} (expires {})",
        role,
        document.expiration.as_deref().unwrap_or("unknown")
    );

    Ok(AwsCredentials::new(
        document.access_key_id,
        document.secret_access_key,
        document.token,
    ))
}

/// Default location of the shared credentials file
pub fn default_credentials_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".aws").join("credentials"))
}
