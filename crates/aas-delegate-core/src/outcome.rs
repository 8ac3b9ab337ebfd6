//! Invocation outcomes.

use crate::normalizer::{ExtractedValue, NormalizationError};

/// Result of a single delegated invocation.
pub type InvocationResult = Result<InvocationSuccess, InvocationError>;

/// A value that was written to the backing repository.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationSuccess {
    /// Value written, as extracted from the request
    pub value: ExtractedValue,
    /// `$value` URL that was contacted
    pub target_url: String,
}

/// Terminal failures of a delegated invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvocationError {
    /// The request carried no usable value; nothing was sent upstream
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    /// The repository could not be reached or did not answer in time
    #[error("upstream unavailable: {cause}")]
    UpstreamUnavailable {
        /// Network-level failure description
        cause: String,
    },
    /// The repository answered with a non-success status
    #[error("upstream rejected update (status {status}): {body}")]
    UpstreamRejected {
        /// HTTP status code returned by the repository
        status: u16,
        /// Response body, verbatim
        body: String,
    },
    /// Any other fault while handling the request
    #[error("internal error: {message}")]
    Internal {
        /// Fault description
        message: String,
    },
}

impl InvocationError {
    /// Stable failure class, for logs and metrics labels.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Normalization(_) => "normalization",
            Self::UpstreamUnavailable { .. } => "upstream-unavailable",
            Self::UpstreamRejected { .. } => "upstream-rejected",
            Self::Internal { .. } => "internal",
        }
    }

    /// Whether the repository was contacted before this failure.
    #[must_use]
    pub fn reached_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::UpstreamRejected { .. }
        )
    }
}
