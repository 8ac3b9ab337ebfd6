//! Invocation sequencing: normalize, then propagate.

use crate::config::BridgeConfig;
use aas_delegate_adapter_aas::{PropertyTarget, ValuePropagator};
use aas_delegate_core::{InvocationError, InvocationRequest, InvocationResult, Normalizer};
use anyhow::{Context, Result};
use std::fmt;

/// Per-request processing stage.
///
/// `NormalizationFailed`, `PropagationFailed` and `Propagated` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Body accepted by the server
    Received,
    /// Extracting the value
    Normalizing,
    /// Value extracted
    Normalized,
    /// Writing to the repository
    Propagating,
    /// No value could be extracted
    NormalizationFailed,
    /// The repository write failed
    PropagationFailed,
    /// The repository write succeeded
    Propagated,
}

impl Stage {
    /// Terminal stage reached by a finished invocation.
    #[must_use]
    pub fn of(result: &InvocationResult) -> Self {
        match result {
            Ok(_) => Self::Propagated,
            Err(InvocationError::Normalization(_)) => Self::NormalizationFailed,
            Err(_) => Self::PropagationFailed,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Normalizing => "normalizing",
            Self::Normalized => "normalized",
            Self::Propagating => "propagating",
            Self::NormalizationFailed => "normalization-failed",
            Self::PropagationFailed => "propagation-failed",
            Self::Propagated => "propagated",
        };
        f.write_str(name)
    }
}

/// Handles delegated Operation invocations.
///
/// Holds no per-request state; one instance serves all requests concurrently.
#[derive(Debug, Clone)]
pub struct Bridge {
    normalizer: Normalizer,
    propagator: ValuePropagator,
}

impl Bridge {
    /// Create a bridge from its two stages.
    #[must_use]
    pub fn new(normalizer: Normalizer, propagator: ValuePropagator) -> Self {
        Self {
            normalizer,
            propagator,
        }
    }

    /// Create a bridge from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the target is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let target = config.target()?;
        let propagator = ValuePropagator::new(config.client_config(), target)
            .context("Failed to create repository client")?;
        Ok(Self::new(
            Normalizer::new(config.normalizer.clone()),
            propagator,
        ))
    }

    /// The property written by this bridge.
    #[must_use]
    pub fn target(&self) -> &PropertyTarget {
        self.propagator.target()
    }

    /// Handle one invocation body.
    ///
    /// Normalization failures return before any outbound call is made.
    pub async fn invoke(&self, body: &[u8]) -> InvocationResult {
        tracing::debug!(stage = %Stage::Received, bytes = body.len(), "Invocation received");

        let result = self.run(body).await;
        let stage = Stage::of(&result);
        match &result {
            Ok(success) => tracing::info!(
                %stage,
                value = %success.value,
                target_url = %success.target_url,
                "Operation executed"
            ),
            Err(InvocationError::Normalization(err)) => tracing::warn!(
                %stage,
                reason = err.reason(),
                error = %err,
                "Invocation rejected"
            ),
            Err(err) => tracing::warn!(
                %stage,
                kind = err.kind(),
                error = %err,
                "Repository update failed"
            ),
        }
        result
    }

    async fn run(&self, body: &[u8]) -> InvocationResult {
        tracing::debug!(stage = %Stage::Normalizing, "Extracting value");
        let request = InvocationRequest::parse(body)?;
        tracing::debug!(shape = request.shape(), "Parsed invocation body");
        let value = self.normalizer.normalize(&request)?;
        tracing::debug!(stage = %Stage::Normalized, %value, "Value extracted");

        tracing::debug!(
            stage = %Stage::Propagating,
            target_url = %self.target(),
            "Writing value"
        );
        Ok(self.propagator.propagate(&value).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aas_delegate_core::{ExtractedValue, InvocationSuccess, NormalizationError};

    #[test]
    fn terminal_stages() {
        let ok: InvocationResult = Ok(InvocationSuccess {
            value: ExtractedValue::Bool(true),
            target_url: "http://repo/$value".to_string(),
        });
        assert_eq!(Stage::of(&ok), Stage::Propagated);

        let rejected: InvocationResult = Err(NormalizationError::NoMatch.into());
        assert_eq!(Stage::of(&rejected), Stage::NormalizationFailed);

        let failed: InvocationResult = Err(InvocationError::UpstreamUnavailable {
            cause: "timeout".to_string(),
        });
        assert_eq!(Stage::of(&failed), Stage::PropagationFailed);

        assert_eq!(Stage::NormalizationFailed.to_string(), "normalization-failed");
    }

    #[tokio::test]
    async fn bad_payload_never_reaches_repository() {
        // Nothing listens on the discard port; a network attempt would surface
        // as an upstream failure instead of a normalization failure.
        let mut config = BridgeConfig::default();
        config.repository.repo_url = "http://127.0.0.1:9".to_string();
        let bridge = Bridge::from_config(&config).unwrap();

        let bodies: [&[u8]; 4] = [b"{}", b"[]", b"nope", br#"{"other": 1}"#];
        for body in bodies {
            let err = bridge.invoke(body).await.unwrap_err();
            assert!(!err.reached_upstream(), "{err}");
            assert_eq!(err.kind(), "normalization");
        }
    }
}
