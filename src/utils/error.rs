use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV rendering error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Session expired or token rejected by the server")]
    Unauthorized,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Role {role} is not allowed to {action}")]
    Forbidden { role: String, action: String },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },
}

pub type Result<T> = std::result::Result<T, AdminError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Authorization,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdminError {
    pub fn validation(message: impl Into<String>) -> Self {
        AdminError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdminError::HttpError(_) | AdminError::ApiError { .. } => ErrorCategory::Network,
            AdminError::Unauthorized | AdminError::NotAuthenticated => {
                ErrorCategory::Authentication
            }
            AdminError::Forbidden { .. } => ErrorCategory::Authorization,
            AdminError::ConfigValidationError { .. }
            | AdminError::InvalidConfigValueError { .. }
            | AdminError::MissingConfigError { .. }
            | AdminError::UrlError(_) => ErrorCategory::Configuration,
            AdminError::SerializationError(_)
            | AdminError::CsvError(_)
            | AdminError::ValidationError { .. }
            | AdminError::NotFound { .. } => ErrorCategory::Data,
            AdminError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdminError::HttpError(_) => ErrorSeverity::Medium,
            AdminError::ApiError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            AdminError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AdminError::HttpError(_) => {
                "Check that the API base URL is reachable and try again".to_string()
            }
            AdminError::ApiError { status, .. } if *status >= 500 => {
                "The backend failed to handle the request, retry later".to_string()
            }
            AdminError::ApiError { .. } => "Check the submitted values and try again".to_string(),
            AdminError::Unauthorized | AdminError::NotAuthenticated => {
                "Run `tomato-admin login` to start a new session".to_string()
            }
            AdminError::Forbidden { .. } => {
                "Ask an administrator for a role with this permission".to_string()
            }
            AdminError::ConfigValidationError { field, .. }
            | AdminError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in the config file or CLI flags", field)
            }
            AdminError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            AdminError::UrlError(_) => "Use an absolute http(s) URL".to_string(),
            AdminError::NotFound { .. } => "Double-check the id, it may have been deleted".to_string(),
            AdminError::SerializationError(_) => {
                "The backend answered with an unexpected payload shape".to_string()
            }
            AdminError::ValidationError { .. } => "Correct the input and retry".to_string(),
            AdminError::CsvError(_) | AdminError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdminError::HttpError(e) if e.is_timeout() => "The server took too long to answer".to_string(),
            AdminError::HttpError(_) => "Could not reach the server".to_string(),
            AdminError::ApiError { message, .. } => message.clone(),
            AdminError::Unauthorized => "Your session has expired, please log in again".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = AdminError::ApiError {
            status: 503,
            message: "down".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = AdminError::ApiError {
            status: 400,
            message: "name is required".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "name is required");

        let err = AdminError::Forbidden {
            role: "FARMER".to_string(),
            action: "delete detections".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Authorization);
        assert_eq!(err.to_string(), "Role FARMER is not allowed to delete detections");
    }

    #[test]
    fn test_unauthorized_suggests_login() {
        assert!(AdminError::Unauthorized
            .recovery_suggestion()
            .contains("login"));
    }
}
