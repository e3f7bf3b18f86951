//! Vendor error type and error-code classification

use thiserror::Error;

/// Cluster lookups answer with this code when the id is unknown
pub const ERROR_CLUSTER_NOT_FOUND: &str = "ErrorClusterNotFound";

/// Container application lookups answer with this code when the app is unknown
pub const APPLICATION_NOT_FOUND: &str = "Not Found";

/// Code used for failures raised by the client itself (connection, signing)
pub const CLIENT_FAILURE: &str = "AliyunGoClientFailure";

pub const SERVICE_UNAVAILABLE: &str = "ServiceUnavailable";

pub const THROTTLING: &str = "Throttling";

/// Codes that mean "the resource does not exist" across products
pub const NOT_FOUND_CODES: &[&str] = &[
    "EntityNotExist",
    "EntityNotExist.Role",
    "InvalidResourceId.NotFound",
    "InvalidInstanceId.NotFound",
    "Forbidden.InstanceNotFound",
    "InstanceNotFound",
    "ResourceNotfound",
    "ResourceNotFound",
    "NotFound",
];

/// Error reported by the vendor client adapter
#[derive(Debug, Clone, Error)]
pub enum VendorError {
    /// The service answered with an error code
    #[error("{code}: {message}")]
    Service {
        code: String,
        message: String,
        http_status: Option<u16>,
        request_id: Option<String>,
    },

    /// The request never produced a service answer
    #[error("AliyunGoClientFailure: {0}")]
    Client(String),

    /// A retryable error persisted past the retry budget
    #[error("Retry timeout and got an error: {last}")]
    RetryExhausted { last: Box<VendorError> },

    /// The response body did not match the expected shape
    #[error("Failed to decode {action} response: {message}")]
    Decode { action: String, message: String },
}

impl VendorError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
            http_status: None,
            request_id: None,
        }
    }

    pub fn with_http_status(self, status: u16) -> Self {
        match self {
            Self::Service {
                code,
                message,
                request_id,
                ..
            } => Self::Service {
                code,
                message,
                http_status: Some(status),
                request_id,
            },
            other => other,
        }
    }

    pub fn with_request_id(self, id: impl Into<String>) -> Self {
        match self {
            Self::Service {
                code,
                message,
                http_status,
                ..
            } => Self::Service {
                code,
                message,
                http_status,
                request_id: Some(id.into()),
            },
            other => other,
        }
    }

    /// Error code used for classification
    pub fn code(&self) -> &str {
        match self {
            Self::Service { code, .. } => code,
            Self::Client(_) => CLIENT_FAILURE,
            Self::RetryExhausted { last } => last.code(),
            Self::Decode { .. } => "DecodeFailure",
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Service { http_status, .. } => *http_status,
            Self::RetryExhausted { last } => last.http_status(),
            _ => None,
        }
    }

    /// Whether the code is one of `codes`
    pub fn is_expected(&self, codes: &[&str]) -> bool {
        let code = self.code();
        codes.iter().any(|c| *c == code)
    }

    /// Explicit not-found signal: HTTP 404 or a well-known not-found code
    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404) || self.is_expected(NOT_FOUND_CODES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_by_code() {
        assert!(VendorError::service("InstanceNotFound", "gone").is_not_found());
        assert!(!VendorError::service("Throttling", "slow down").is_not_found());
    }

    #[test]
    fn not_found_by_http_status() {
        let err = VendorError::service("Unknown", "missing").with_http_status(404);
        assert!(err.is_not_found());
    }

    #[test]
    fn cluster_not_found_is_not_a_generic_not_found() {
        let err = VendorError::service(ERROR_CLUSTER_NOT_FOUND, "cluster c-1 not found");
        assert!(!err.is_not_found());
        assert!(err.is_expected(&[ERROR_CLUSTER_NOT_FOUND]));
    }

    #[test]
    fn retry_exhausted_keeps_last_code() {
        let err = VendorError::RetryExhausted {
            last: Box::new(VendorError::service(THROTTLING, "Request was denied")),
        };
        assert_eq!(err.code(), THROTTLING);
        assert_eq!(
            err.to_string(),
            "Retry timeout and got an error: Throttling: Request was denied"
        );
    }

    #[test]
    fn client_failure_display() {
        let err = VendorError::Client("connection reset".to_string());
        assert_eq!(err.code(), CLIENT_FAILURE);
        assert_eq!(err.to_string(), "AliyunGoClientFailure: connection reset");
    }
}
