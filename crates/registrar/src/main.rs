// # registrar - register this instance in DNS
//
// A thin integration layer: it reads configuration, wires the metadata
// source and DNS provider together through the registry, and runs a single
// registration. All resolution logic lives in registrar-core.
//
// ## Usage
//
// ```bash
// # On an instance with an IAM role, no credentials are needed
// registrar web-1.prod.example.com
//
// # Elsewhere, use a profile from ~/.aws/credentials
// AWS_PROFILE=dns registrar web-1.prod.example.com
// ```
//
// ## Configuration
//
// Configuration is via environment variables; credentials may also come
// from the AWS shared credentials file or the instance role.
//
// ### Credentials
// Tried in order; the first complete key pair wins.
// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: Static keys (set both or neither)
// - `AWS_SESSION_TOKEN`: Optional, for temporary static keys
// - `AWS_SHARED_CREDENTIALS_FILE`: Shared credentials file (default ~/.aws/credentials)
// - `AWS_PROFILE`: Profile in that file (default `default`)
// - Otherwise the instance role, read from the metadata service
//
// ### Endpoints
// - `REGISTRAR_ROUTE53_ENDPOINT`: Route 53 API endpoint override
// - `REGISTRAR_IMDS_ENDPOINT`: Instance metadata endpoint override
// - `REGISTRAR_IMDS_TIMEOUT_SECS`: Metadata request timeout (default 2)
//
// ### Behaviour
// - `REGISTRAR_MODE`: `live` (default) or `dry-run`
// - `REGISTRAR_LOG_LEVEL`: trace, debug, info (default), warn, error

use anyhow::{Context, Result};
use clap::Parser;
use registrar_core::{
    MetadataConfig, ProviderConfig, ProviderRegistry, RegistrarConfig, Registrar,
    RegistrationOutcome,
};
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible run results
///
/// - 0: Registered (or the change request was logged as failed)
/// - 1: Configuration or startup error
/// - 2: No address or no hosted zone could be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistrarExitCode {
    Success = 0,
    ConfigError = 1,
    RegistrationError = 2,
}

impl From<RegistrarExitCode> for ExitCode {
    fn from(code: RegistrarExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "registrar")]
#[command(about = "Register this instance's address as a DNS A record", long_about = None)]
#[command(version)]
struct Cli {
    /// Fully-qualified host name to register (e.g. foo.bar.com)
    host: String,

    /// Build and log the change, but do not submit it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Application configuration
struct Config {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    profile: Option<String>,
    credentials_file: Option<String>,
    route53_endpoint: Option<String>,
    imds_endpoint: Option<String>,
    imds_timeout_secs: Option<String>,
    mode: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_key_id = non_empty("AWS_ACCESS_KEY_ID");
        let secret_access_key = non_empty("AWS_SECRET_ACCESS_KEY");
        match (&access_key_id, &secret_access_key) {
            (Some(_), None) => {
                anyhow::bail!("AWS_SECRET_ACCESS_KEY is required when AWS_ACCESS_KEY_ID is set")
            }
            (None, Some(_)) => {
                anyhow::bail!("AWS_ACCESS_KEY_ID is required when AWS_SECRET_ACCESS_KEY is set")
            }
            _ => {}
        }

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: non_empty("AWS_SESSION_TOKEN"),
            profile: non_empty("AWS_PROFILE"),
            credentials_file: non_empty("AWS_SHARED_CREDENTIALS_FILE"),
            route53_endpoint: non_empty("REGISTRAR_ROUTE53_ENDPOINT"),
            imds_endpoint: non_empty("REGISTRAR_IMDS_ENDPOINT"),
            imds_timeout_secs: non_empty("REGISTRAR_IMDS_TIMEOUT_SECS"),
            mode: non_empty("REGISTRAR_MODE").unwrap_or_else(|| "live".to_string()),
            log_level: non_empty("REGISTRAR_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the values that are not checked by `RegistrarConfig`
    fn validate(&self) -> Result<()> {
        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "REGISTRAR_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        if parse_level(&self.log_level).is_none() {
            anyhow::bail!(
                "REGISTRAR_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }

        Ok(())
    }

    fn dry_run(&self) -> bool {
        self.mode.eq_ignore_ascii_case("dry-run")
    }

    /// Build the core configuration
    fn registrar_config(&self, cli: &Cli) -> Result<RegistrarConfig> {
        let mut config = RegistrarConfig::new(ProviderConfig::Route53 {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
            profile: self.profile.clone(),
            credentials_file: self.credentials_file.clone(),
            imds_endpoint: self.imds_endpoint.clone(),
            endpoint: self.route53_endpoint.clone(),
        });

        let MetadataConfig::Imds {
            endpoint,
            timeout_secs,
        } = &mut config.metadata;
        *endpoint = self.imds_endpoint.clone();
        if let Some(raw) = &self.imds_timeout_secs {
            *timeout_secs = raw.trim().parse().with_context(|| {
                format!(
                    "REGISTRAR_IMDS_TIMEOUT_SECS must be a whole number of seconds. Got: {}",
                    raw
                )
            })?;
        }

        config.options.dry_run = cli.dry_run || self.dry_run();
        config.validate()?;

        Ok(config)
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                RegistrarExitCode::ConfigError.into()
            } else {
                RegistrarExitCode::Success.into()
            };
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return RegistrarExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return RegistrarExitCode::ConfigError.into();
    }

    let registrar_config = match config.registrar_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return RegistrarExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        parse_level(&config.log_level).unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RegistrarExitCode::ConfigError.into();
    }

    if registrar_config.options.dry_run {
        warn!("Running in DRY-RUN mode - no changes will be submitted");
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RegistrarExitCode::ConfigError.into();
        }
    };

    rt.block_on(run(&cli.host, registrar_config)).into()
}

/// Wire the components together and run one registration
async fn run(host: &str, config: RegistrarConfig) -> RegistrarExitCode {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "route53")]
    registrar_provider_route53::register(&registry);

    #[cfg(feature = "imds")]
    registrar_metadata_imds::register(&registry);

    let components = registry.create_metadata_source(&config.metadata).and_then(|metadata| {
        let provider = registry.create_provider(&config.provider)?;
        Registrar::new(metadata, provider, &config)
    });

    let (registrar, mut events) = match components {
        Ok(parts) => parts,
        Err(e) => {
            error!("Startup error: {}", e);
            return RegistrarExitCode::ConfigError;
        }
    };

    info!("Registering {}", host);
    let result = registrar.register(host).await;

    while let Ok(event) = events.try_recv() {
        debug!("Event: {:?}", event);
    }

    match result {
        Ok(outcome) => {
            report(&outcome);
            RegistrarExitCode::Success
        }
        Err(e) if e.is_fatal() => {
            error!("{}", e);
            RegistrarExitCode::RegistrationError
        }
        Err(e) => {
            error!("{}", e);
            RegistrarExitCode::ConfigError
        }
    }
}

fn report(outcome: &RegistrationOutcome) {
    match &outcome.change {
        Some(change) => info!(
            "Registered {} -> {} in zone {} (change {}, {})",
            outcome.host, outcome.address, outcome.zone, change.id, change.status
        ),
        None => info!(
            "Registration of {} -> {} in zone {} finished without an accepted change",
            outcome.host, outcome.address, outcome.zone
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("registrar").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn test_cli_requires_exactly_one_host() {
        assert!(Cli::try_parse_from(["registrar"]).is_err());
        assert!(Cli::try_parse_from(["registrar", "a.com", "b.com"]).is_err());

        let parsed = cli(&["foo.bar.com", "--dry-run", "-v"]);
        assert_eq!(parsed.host, "foo.bar.com");
        assert!(parsed.dry_run);
        assert!(parsed.verbose);
    }

    #[test]
    fn test_half_a_key_pair_rejected() {
        let result = Config::from_lookup(lookup(&[("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")]));
        let err = result.err().expect("secret key is required");
        assert!(err.to_string().contains("AWS_SECRET_ACCESS_KEY"));

        let result = Config::from_lookup(lookup(&[("AWS_SECRET_ACCESS_KEY", "secret")]));
        let err = result.err().expect("key ID is required");
        assert!(err.to_string().contains("AWS_ACCESS_KEY_ID"));
    }

    #[test]
    fn test_credentials_optional() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        config.validate().unwrap();

        let core = config
            .registrar_config(&cli(&["foo.bar.com", "--dry-run"]))
            .unwrap();
        assert!(matches!(
            &core.provider,
            ProviderConfig::Route53 {
                access_key_id: None,
                secret_access_key: None,
                ..
            }
        ));
    }

    #[test]
    fn test_shared_credentials_settings() {
        let vars = [
            ("AWS_PROFILE", "dns"),
            ("AWS_SHARED_CREDENTIALS_FILE", "/etc/registrar/credentials"),
        ];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        let core = config.registrar_config(&cli(&["foo.bar.com"])).unwrap();

        assert!(matches!(
            &core.provider,
            ProviderConfig::Route53 { profile: Some(p), credentials_file: Some(f), .. }
                if p == "dns" && f == "/etc/registrar/credentials"
        ));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&credentials())).unwrap();
        config.validate().unwrap();

        let core = config.registrar_config(&cli(&["foo.bar.com"])).unwrap();
        assert!(!core.options.dry_run);
        assert_eq!(core.provider.type_name(), "route53");
        assert!(matches!(
            core.metadata,
            MetadataConfig::Imds { endpoint: None, timeout_secs: 2 }
        ));
    }

    #[test]
    fn test_dry_run_from_mode_or_flag() {
        let mut vars = credentials();
        vars.push(("REGISTRAR_MODE", "dry-run"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(config.registrar_config(&cli(&["foo.bar.com"])).unwrap().options.dry_run);

        let config = Config::from_lookup(lookup(&credentials())).unwrap();
        assert!(
            config
                .registrar_config(&cli(&["foo.bar.com", "--dry-run"]))
                .unwrap()
                .options
                .dry_run
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut vars = credentials();
        vars.push(("REGISTRAR_MODE", "sometimes"));
        assert!(Config::from_lookup(lookup(&vars)).unwrap().validate().is_err());

        let mut vars = credentials();
        vars.push(("REGISTRAR_LOG_LEVEL", "loud"));
        assert!(Config::from_lookup(lookup(&vars)).unwrap().validate().is_err());

        let mut vars = credentials();
        vars.push(("REGISTRAR_IMDS_TIMEOUT_SECS", "soon"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(config.registrar_config(&cli(&["foo.bar.com"])).is_err());

        let mut vars = credentials();
        vars.push(("REGISTRAR_ROUTE53_ENDPOINT", "ftp://route53"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(config.registrar_config(&cli(&["foo.bar.com"])).is_err());
    }

    #[test]
    fn test_endpoint_overrides() {
        let mut vars = credentials();
        vars.push(("REGISTRAR_IMDS_ENDPOINT", "http://127.0.0.1:1338"));
        vars.push(("REGISTRAR_IMDS_TIMEOUT_SECS", "5"));
        vars.push(("AWS_SESSION_TOKEN", "token"));

        let config = Config::from_lookup(lookup(&vars)).unwrap();
        let core = config.registrar_config(&cli(&["foo.bar.com"])).unwrap();

        assert!(matches!(
            &core.metadata,
            MetadataConfig::Imds { endpoint: Some(e), timeout_secs: 5 } if e == "http://127.0.0.1:1338"
        ));
        assert!(matches!(
            &core.provider,
            ProviderConfig::Route53 { session_token: Some(t), imds_endpoint: Some(e), .. }
                if t == "token" && e == "http://127.0.0.1:1338"
        ));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("verbose"), None);
    }
}
