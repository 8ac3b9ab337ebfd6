//! Bridge configuration.

use aas_delegate_adapter_aas::{AasClientConfig, PropertyTarget};
use aas_delegate_core::NormalizerConfig;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default cap on an invocation body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Bridge configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Inbound HTTP listener
    pub server: ServerConfig,

    /// Backing repository and target property
    pub repository: RepositoryConfig,

    /// Accepted value names
    pub normalizer: NormalizerConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Largest accepted request body, in bytes
    pub max_body_bytes: usize,
}

/// Repository configuration.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Full `$value` URL; takes precedence over the parts below
    pub target_url: Option<String>,

    /// Submodel repository base URL
    pub repo_url: String,

    /// Submodel identifier (not encoded)
    pub submodel_id: String,

    /// idShort path of the target property
    pub property_path: String,

    /// Timeout for the outbound write
    pub timeout: Duration,

    /// Bearer token for authentication
    pub bearer_token: Option<String>,

    /// CA certificate for HTTPS repositories
    pub ca_cert_path: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            repository: RepositoryConfig {
                target_url: None,
                repo_url: "http://localhost:8081".to_string(),
                submodel_id: "urn:example:sm:ops:1".to_string(),
                property_path: "pumpValue".to_string(),
                timeout: Duration::from_secs(5),
                bearer_token: None,
                ca_cert_path: None,
            },
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DELEGATE_TARGET_URL`: Full `$value` URL of the target property
    /// - `DELEGATE_REPO_URL`: Submodel repository URL
    /// - `DELEGATE_SUBMODEL_ID`: Submodel identifier
    /// - `DELEGATE_PROPERTY_PATH`: idShort path of the target property
    /// - `DELEGATE_ARGUMENT_ALIASES`: Comma-separated accepted argument idShorts
    /// - `DELEGATE_FIELD_ALIASES`: Comma-separated accepted object keys
    /// - `DELEGATE_HOST` / `DELEGATE_PORT`: Listener address
    /// - `DELEGATE_MAX_BODY_BYTES`: Largest accepted request body
    /// - `DELEGATE_TIMEOUT_SECS`: Outbound timeout in seconds
    /// - `DELEGATE_BEARER_TOKEN`: Repository bearer token
    /// - `DELEGATE_CA_CERT`: PEM CA certificate path
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DELEGATE_TARGET_URL") {
            config.repository.target_url = Some(url);
        }

        if let Some(url) = lookup("DELEGATE_REPO_URL") {
            config.repository.repo_url = url;
        }

        if let Some(id) = lookup("DELEGATE_SUBMODEL_ID") {
            config.repository.submodel_id = id;
        }

        if let Some(path) = lookup("DELEGATE_PROPERTY_PATH") {
            config.repository.property_path = path;
        }

        if let Some(aliases) = lookup("DELEGATE_ARGUMENT_ALIASES") {
            config.normalizer.argument_aliases = split_list(&aliases);
        }

        if let Some(aliases) = lookup("DELEGATE_FIELD_ALIASES") {
            config.normalizer.field_aliases = split_list(&aliases);
        }

        if let Some(host) = lookup("DELEGATE_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("DELEGATE_PORT") {
            config.server.port = port.parse().context("Invalid DELEGATE_PORT")?;
        }

        if let Some(limit) = lookup("DELEGATE_MAX_BODY_BYTES") {
            config.server.max_body_bytes =
                limit.parse().context("Invalid DELEGATE_MAX_BODY_BYTES")?;
        }

        if let Some(secs) = lookup("DELEGATE_TIMEOUT_SECS") {
            let secs: f64 = secs.parse().context("Invalid DELEGATE_TIMEOUT_SECS")?;
            config.repository.timeout =
                Duration::try_from_secs_f64(secs).context("Invalid DELEGATE_TIMEOUT_SECS")?;
        }

        if let Some(token) = lookup("DELEGATE_BEARER_TOKEN") {
            config.repository.bearer_token = Some(token);
        }

        if let Some(path) = lookup("DELEGATE_CA_CERT") {
            config.repository.ca_cert_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that cannot be caught while parsing.
    ///
    /// # Errors
    ///
    /// Returns error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.repository.timeout.is_zero() {
            bail!("DELEGATE_TIMEOUT_SECS must be greater than zero");
        }
        if self.server.max_body_bytes == 0 {
            bail!("DELEGATE_MAX_BODY_BYTES must be greater than zero");
        }
        if self.normalizer.argument_aliases.is_empty() && self.normalizer.field_aliases.is_empty() {
            bail!("At least one argument or field alias must be configured");
        }
        self.target().context("Invalid target property")?;
        Ok(())
    }

    /// The target property's `$value` endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the configured URL or identifiers do not form a valid URL.
    pub fn target(&self) -> Result<PropertyTarget> {
        let repo = &self.repository;
        let target = match &repo.target_url {
            Some(url) => PropertyTarget::parse(url)?,
            None => PropertyTarget::new(&repo.repo_url, &repo.submodel_id, &repo.property_path)?,
        };
        Ok(target)
    }

    /// HTTP client settings for the repository.
    #[must_use]
    pub fn client_config(&self) -> AasClientConfig {
        AasClientConfig {
            timeout: self.repository.timeout,
            bearer_token: self.repository.bearer_token.clone(),
            ca_cert_path: self.repository.ca_cert_path.clone(),
        }
    }

    /// Address the listener binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
