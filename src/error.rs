use std::fmt;
use thiserror::Error;

/// Error codes returned by the inspector2 service that callers branch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    AccessDenied,
    Conflict,
    InternalServer,
    Throttling,
    ResourceNotFound,
    ServiceQuotaExceeded,
    Other(String),
}

impl ErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "ValidationException" => Self::Validation,
            "AccessDeniedException" => Self::AccessDenied,
            "ConflictException" => Self::Conflict,
            "InternalServerException" => Self::InternalServer,
            "ThrottlingException" => Self::Throttling,
            "ResourceNotFoundException" => Self::ResourceNotFound,
            "ServiceQuotaExceededException" => Self::ServiceQuotaExceeded,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Validation => "ValidationException",
            Self::AccessDenied => "AccessDeniedException",
            Self::Conflict => "ConflictException",
            Self::InternalServer => "InternalServerException",
            Self::Throttling => "ThrottlingException",
            Self::ResourceNotFound => "ResourceNotFoundException",
            Self::ServiceQuotaExceeded => "ServiceQuotaExceededException",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by the service (or simulated by the stubber).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    pub status: Option<u16>,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::parse(&self.code)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("Service error ({0})")]
    Service(ServiceError),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Missing AWS credentials: {0} is not set")]
    MissingCredentials(&'static str),
}

impl InspectorError {
    /// The service error code, if this error came from the service.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Service(err) => Some(err.error_code()),
            _ => None,
        }
    }
}

impl From<hmac::digest::InvalidLength> for InspectorError {
    fn from(err: hmac::digest::InvalidLength) -> Self {
        Self::Signing(err.to_string())
    }
}

impl From<ServiceError> for InspectorError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_parse_and_print_back() {
        for code in [
            "ValidationException",
            "AccessDeniedException",
            "ConflictException",
            "InternalServerException",
            "ThrottlingException",
            "ResourceNotFoundException",
            "ServiceQuotaExceededException",
        ] {
            let parsed = ErrorCode::parse(code);
            assert!(!matches!(parsed, ErrorCode::Other(_)), "{code}");
            assert_eq!(parsed.as_str(), code);
        }
    }

    #[test]
    fn unknown_code_is_kept_verbatim() {
        let parsed = ErrorCode::parse("TeapotException");
        assert_eq!(parsed, ErrorCode::Other("TeapotException".to_string()));
        assert_eq!(parsed.to_string(), "TeapotException");
    }

    #[test]
    fn inspector_error_exposes_service_code() {
        let err: InspectorError = ServiceError::new("ConflictException", "busy").into();
        assert_eq!(err.code(), Some(ErrorCode::Conflict));
        assert_eq!(err.to_string(), "Service error (ConflictException: busy)");

        let missing = InspectorError::MissingCredentials("AWS_ACCESS_KEY_ID");
        assert!(missing.code().is_none());
    }
}
