//! Saga error types.

use thiserror::Error;

/// Outcome of a failed call to one of the backend services.
///
/// Every backend client classifies its responses into exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The backend rejected the request (4xx).
    #[error("request rejected with status {status}: {message}")]
    Client { status: u16, message: String },

    /// The backend failed to process the request (5xx).
    #[error("backend failed with status {status}: {message}")]
    Server { status: u16, message: String },

    /// The backend could not be reached: connection failure, timeout or open circuit.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a status the operation does not expect.
    #[error("unexpected status {status}")]
    Unknown { status: u16 },

    /// The backend answered successfully but the body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Returns true for a 404 answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Client { status: 404, .. })
    }

    /// Returns true for any 4xx answer.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Client { .. })
    }
}

/// Errors surfaced by the booking orchestrator.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The request is malformed; no backend has been called.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced hotel or reservation does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the requested reservation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A backend could not be reached.
    #[error("Step '{step}' failed, backend unavailable: {reason}")]
    UpstreamUnavailable { step: &'static str, reason: String },

    /// A backend rejected the request.
    #[error("Step '{step}' rejected by backend ({status}): {message}")]
    UpstreamClient {
        step: &'static str,
        status: u16,
        message: String,
    },

    /// A backend failed or answered with an unexpected status.
    #[error("Step '{step}' failed in backend ({status}): {message}")]
    UpstreamServer {
        step: &'static str,
        status: u16,
        message: String,
    },

    /// A response could not be decoded or a request could not be encoded.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SagaError {
    /// Classifies a backend failure that happened during `step`.
    pub fn upstream(step: &'static str, err: ServiceError) -> Self {
        match err {
            ServiceError::Client { status, message } => SagaError::UpstreamClient {
                step,
                status,
                message,
            },
            ServiceError::Server { status, message } => SagaError::UpstreamServer {
                step,
                status,
                message,
            },
            ServiceError::Unknown { status } => SagaError::UpstreamServer {
                step,
                status,
                message: "unexpected status".to_string(),
            },
            ServiceError::Unavailable(reason) => SagaError::UpstreamUnavailable { step, reason },
            ServiceError::Decode(reason) => {
                SagaError::Internal(format!("step '{step}' returned an invalid body: {reason}"))
            }
        }
    }

    /// The saga step this error belongs to, if it came from a backend.
    pub fn step(&self) -> Option<&'static str> {
        match self {
            SagaError::UpstreamUnavailable { step, .. }
            | SagaError::UpstreamClient { step, .. }
            | SagaError::UpstreamServer { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
