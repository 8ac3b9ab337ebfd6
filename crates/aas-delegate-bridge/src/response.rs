//! Response envelopes for `/op`.

use aas_delegate_core::{InvocationError, InvocationResult};
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// HTTP rendering of an [`InvocationResult`].
#[derive(Debug)]
pub struct Envelope(pub InvocationResult);

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(success) => (
                StatusCode::OK,
                Json(json!({
                    "message": "Operation executed",
                    "wrote": success.value,
                    "basyx_url": success.target_url,
                })),
            )
                .into_response(),
            Err(err) => error_response(&err),
        }
    }
}

/// Status code for a failed invocation.
#[must_use]
pub fn status_for(err: &InvocationError) -> StatusCode {
    match err {
        InvocationError::Normalization(_) => StatusCode::BAD_REQUEST,
        InvocationError::UpstreamUnavailable { .. } | InvocationError::UpstreamRejected { .. } => {
            StatusCode::BAD_GATEWAY
        }
        InvocationError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render a failed invocation.
///
/// Normalization failures never mention the target URL.
#[must_use]
pub fn error_response(err: &InvocationError) -> Response {
    let body = match err {
        InvocationError::Normalization(reason) => json!({
            "error": reason.to_string(),
            "reason": reason.reason(),
        }),
        InvocationError::UpstreamRejected { status, body } => json!({
            "message": "BaSyx update failed",
            "error": err.kind(),
            "status_code": status,
            "text": body,
        }),
        InvocationError::UpstreamUnavailable { cause } => json!({
            "message": "Network error contacting BaSyx",
            "error": cause,
        }),
        InvocationError::Internal { message } => json!({
            "message": "Unexpected error",
            "error": message,
        }),
    };

    (status_for(err), Json(body)).into_response()
}

/// Render a body that could not be read, before any normalization.
#[must_use]
pub fn rejection_response(rejection: &BytesRejection) -> Response {
    let status = rejection.status();
    let reason = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "body-too-large"
    } else {
        "malformed-body"
    };

    let body = json!({
        "message": "Request body rejected",
        "error": rejection.body_text(),
        "reason": reason,
    });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aas_delegate_core::NormalizationError;

    #[test]
    fn statuses() {
        assert_eq!(
            status_for(&NormalizationError::MissingKey.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&InvocationError::UpstreamRejected {
                status: 500,
                body: String::new()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&InvocationError::UpstreamUnavailable {
                cause: "refused".to_string()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&InvocationError::Internal {
                message: "boom".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
