//! Error taxonomy for the Nova relay.

use thiserror::Error;

/// Every failure a relay operation can surface to a client.
///
/// The variants keep their internal cause for logging and tests. Clients
/// only ever see [`RelayError::public_message`].
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or rejected credential
    #[error("Authentication failed")]
    Unauthorized,

    /// Verification code unknown, already used, or expired
    #[error("Invalid or expired verification code")]
    InvalidCode,

    /// Missing or malformed client input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Request body exceeded the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// The ask endpoint has been switched off
    #[error("Ask endpoint is disabled")]
    AskDisabled,

    /// Delegate service failed or returned nothing usable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Flat store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Template rendering or other local fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::InvalidCode => 401,
            Self::Validation(_) => 400,
            Self::PayloadTooLarge => 413,
            Self::AskDisabled => 403,
            Self::Upstream(_) => 500,
            Self::Storage(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Message safe to show a client. Server-side causes are not disclosed.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized access".to_string(),
            Self::InvalidCode => "Invalid or expired code".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::PayloadTooLarge => "Request body too large".to_string(),
            Self::AskDisabled => "Ask endpoint is currently disabled.".to_string(),
            Self::Upstream(_) | Self::Storage(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Returns true if the cause should be logged as a server fault
    pub fn is_server_fault(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayError::Unauthorized.status_code(), 401);
        assert_eq!(RelayError::InvalidCode.status_code(), 401);
        assert_eq!(RelayError::Validation("x".into()).status_code(), 400);
        assert_eq!(RelayError::PayloadTooLarge.status_code(), 413);
        assert_eq!(RelayError::AskDisabled.status_code(), 403);
        assert_eq!(RelayError::Upstream("x".into()).status_code(), 500);
        assert_eq!(RelayError::Storage("x".into()).status_code(), 500);
    }

    #[test]
    fn test_server_causes_are_hidden() {
        let err = RelayError::Storage("permission denied: /srv/data.json".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("permission denied"));

        let err = RelayError::Upstream("HTTP 429".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.is_server_fault());
    }

    #[test]
    fn test_validation_message_is_shown() {
        let err = RelayError::Validation("Text data is required".into());
        assert_eq!(err.public_message(), "Text data is required");
        assert!(!err.is_server_fault());
    }
}
