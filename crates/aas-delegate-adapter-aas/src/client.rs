//! HTTP client for property `$value` writes.

use aas_delegate_core::ExtractedValue;
use reqwest::Client;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// AAS repository client configuration.
#[derive(Debug, Clone)]
pub struct AasClientConfig {
    /// Upper bound on a whole request, connect included
    pub timeout: Duration,
    /// Optional bearer token for authentication
    pub bearer_token: Option<String>,
    /// Custom CA certificate path for self-signed server certs (PEM format)
    pub ca_cert_path: Option<PathBuf>,
}

impl Default for AasClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            bearer_token: None,
            ca_cert_path: None,
        }
    }
}

/// HTTP client for the submodel repository.
///
/// Wraps a pooled `reqwest` client; connections are reused across invocations.
#[derive(Debug, Clone)]
pub struct AasClient {
    client: Client,
    config: AasClientConfig,
}

impl AasClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created, or if the CA
    /// certificate cannot be read or parsed.
    pub fn new(config: AasClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(ca_path) = &config.ca_cert_path {
            let ca_cert = fs::read(ca_path).map_err(|e| {
                ClientError::Init(format!(
                    "failed to read CA certificate {}: {e}",
                    ca_path.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&ca_cert)
                .map_err(|e| ClientError::Init(format!("failed to parse CA certificate: {e}")))?;
            builder = builder.use_rustls_tls().add_root_certificate(cert);
            tracing::debug!(ca_path = %ca_path.display(), "Loaded custom CA certificate");
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the authorization header if configured.
    fn auth_header(&self) -> Option<String> {
        self.config
            .bearer_token
            .as_ref()
            .map(|t| format!("Bearer {t}"))
    }

    /// Replace the value behind a `$value` URL.
    ///
    /// Sends the value as a bare JSON scalar. Makes exactly one attempt and
    /// never reads the current value first.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Unavailable`] on timeout or connection failure
    /// - [`ClientError::ApiError`] on any non-2xx status
    pub async fn patch_value(
        &self,
        url: &Url,
        value: &ExtractedValue,
    ) -> Result<(), ClientError> {
        tracing::debug!(url = %url, %value, "PATCH element $value");

        let mut request = self
            .client
            .patch(url.clone())
            .header("Content-Type", "application/json")
            .json(value);

        if let Some(auth) = self.auth_header() {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await.map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text().await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(
                        status = status.as_u16(),
                        error = %err,
                        "Failed to read error response body"
                    );
                    String::new()
                }
            };
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    fn classify(&self, err: &reqwest::Error) -> ClientError {
        if err.is_builder() {
            ClientError::Request(err.to_string())
        } else if err.is_timeout() {
            ClientError::Unavailable(format!(
                "no response within {}s: {err}",
                self.config.timeout.as_secs_f64()
            ))
        } else {
            ClientError::Unavailable(err.to_string())
        }
    }
}

/// Errors that can occur with the AAS client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// Request could not be built
    #[error("request error: {0}")]
    Request(String),
    /// Repository unreachable or timed out
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    /// API returned an error status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        message: String,
    },
}
