//! Gateway error taxonomy
//!
//! Validation failures carry the full batch of violation messages.
//! Upstream not-found is *not* an error: the resolver represents it as
//! empty/undefined data. Misconfiguration is detected when the endpoint
//! registry loads, so the process refuses to start instead of failing
//! per request.

use thiserror::Error;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request parameter validation failed; all violations batched
    #[error("Parameter validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Upstream content-host failure, with its HTTP status when known
    #[error("Upstream error: {message}")]
    Upstream { status: Option<u16>, message: String },

    /// Invalid endpoint configuration, detected at registry load
    #[error("Endpoint misconfiguration: {0}")]
    Misconfiguration(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// HTTP status for the error envelope. An upstream status is used only
    /// when it is a valid 4xx/5xx, otherwise 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Upstream {
                status: Some(status),
                ..
            } if (400..600).contains(status) => *status,
            Self::Upstream { .. } => 500,
            Self::Misconfiguration(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Detail lines for the error envelope
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = GatewayError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.details().len(), 2);
    }

    #[test]
    fn upstream_status_used_only_when_valid() {
        assert_eq!(GatewayError::upstream(Some(404), "gone").http_status(), 404);
        assert_eq!(GatewayError::upstream(Some(503), "busy").http_status(), 503);
        assert_eq!(GatewayError::upstream(Some(302), "weird").http_status(), 500);
        assert_eq!(GatewayError::upstream(None, "net").http_status(), 500);
    }
}
