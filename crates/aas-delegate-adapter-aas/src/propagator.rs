//! Forwarding of extracted values to the backing repository.

use crate::client::{AasClient, AasClientConfig, ClientError};
use crate::target::PropertyTarget;
use aas_delegate_core::{ExtractedValue, InvocationError, InvocationSuccess};

/// Writes extracted values to one fixed repository property.
///
/// Every call is a single unconditional `$value` replacement, so replaying a
/// value leaves the repository in the same state.
#[derive(Debug, Clone)]
pub struct ValuePropagator {
    client: AasClient,
    target: PropertyTarget,
}

impl ValuePropagator {
    /// Create a propagator for the given target.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: AasClientConfig, target: PropertyTarget) -> Result<Self, ClientError> {
        let client = AasClient::new(config)?;
        Ok(Self::with_client(client, target))
    }

    /// Create a propagator around an existing client.
    #[must_use]
    pub fn with_client(client: AasClient, target: PropertyTarget) -> Self {
        Self { client, target }
    }

    /// The property this propagator writes to.
    #[must_use]
    pub fn target(&self) -> &PropertyTarget {
        &self.target
    }

    /// Replace the target's value.
    ///
    /// # Errors
    ///
    /// - [`PropagationError::Unavailable`] on timeout or connection failure
    /// - [`PropagationError::Rejected`] on a non-2xx response
    /// - [`PropagationError::Internal`] if the request could not be issued at all
    pub async fn propagate(
        &self,
        value: &ExtractedValue,
    ) -> Result<InvocationSuccess, PropagationError> {
        self.client.patch_value(self.target.url(), value).await?;

        Ok(InvocationSuccess {
            value: value.clone(),
            target_url: self.target.to_string(),
        })
    }
}

/// Failures writing to the repository.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropagationError {
    /// Repository unreachable or timed out
    #[error("repository unavailable: {cause}")]
    Unavailable {
        /// Network-level failure description
        cause: String,
    },
    /// Repository answered outside the 2xx range
    #[error("repository rejected update (status {status}): {body}")]
    Rejected {
        /// Upstream status code
        status: u16,
        /// Upstream response text
        body: String,
    },
    /// The request could not be issued
    #[error("{0}")]
    Internal(String),
}

impl From<ClientError> for PropagationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unavailable(cause) => Self::Unavailable { cause },
            ClientError::ApiError { status, message } => Self::Rejected {
                status,
                body: message,
            },
            ClientError::Init(_) | ClientError::Request(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<PropagationError> for InvocationError {
    fn from(err: PropagationError) -> Self {
        match err {
            PropagationError::Unavailable { cause } => Self::UpstreamUnavailable { cause },
            PropagationError::Rejected { status, body } => Self::UpstreamRejected { status, body },
            PropagationError::Internal(message) => Self::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_becomes_rejection() {
        let err: PropagationError = ClientError::ApiError {
            status: 404,
            message: "not found".to_string(),
        }
        .into();
        assert_eq!(
            err,
            PropagationError::Rejected {
                status: 404,
                body: "not found".to_string()
            }
        );

        let err: InvocationError = err.into();
        assert_eq!(err.kind(), "upstream-rejected");
    }

    #[test]
    fn request_error_is_internal() {
        let err: InvocationError =
            PropagationError::from(ClientError::Request("bad header".to_string())).into();
        assert!(
            matches!(err, InvocationError::Internal { message } if message.contains("bad header"))
        );
    }

    #[test]
    fn unavailable_keeps_cause() {
        let err: InvocationError =
            PropagationError::from(ClientError::Unavailable("connection refused".to_string()))
                .into();
        assert_eq!(
            err,
            InvocationError::UpstreamUnavailable {
                cause: "connection refused".to_string()
            }
        );
    }

    #[test]
    fn target_is_exposed() {
        let target =
            PropertyTarget::new("http://repo:8081", "urn:example:sm:ops:1", "pumpValue").unwrap();
        let propagator =
            ValuePropagator::new(AasClientConfig::default(), target.clone()).unwrap();
        assert_eq!(propagator.target(), &target);
    }
}
