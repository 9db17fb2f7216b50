use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Student code not found: {code}")]
    UnknownCode { code: String },

    #[error("Access denied for grade {grade}")]
    GradeDenied { grade: String },

    #[error("Student directory request failed: {0}")]
    GatewayError(#[from] reqwest::Error),

    #[error("Student directory answered with status {status}")]
    GatewayStatus { status: u16 },

    #[error("Ticket encoding failed: {message}")]
    EncodingFault { message: String },

    #[error("Print dispatch failed: {message}")]
    DispatchFailure { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Request,
    Directory,
    Printing,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::InvalidRequest { .. }
            | ServiceError::UnknownCode { .. }
            | ServiceError::GradeDenied { .. } => ErrorCategory::Request,
            ServiceError::GatewayError(_) | ServiceError::GatewayStatus { .. } => {
                ErrorCategory::Directory
            }
            ServiceError::EncodingFault { .. } | ServiceError::DispatchFailure { .. } => {
                ErrorCategory::Printing
            }
            ServiceError::IoError(_) => ErrorCategory::System,
            ServiceError::ConfigError { .. }
            | ServiceError::ConfigValidationError { .. }
            | ServiceError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ServiceError::InvalidRequest { .. }
            | ServiceError::UnknownCode { .. }
            | ServiceError::GradeDenied { .. } => ErrorSeverity::Low,
            // 目錄服務可能只是暫時無法連線
            ServiceError::GatewayError(_)
            | ServiceError::GatewayStatus { .. }
            | ServiceError::DispatchFailure { .. } => ErrorSeverity::Medium,
            ServiceError::EncodingFault { .. }
            | ServiceError::ConfigError { .. }
            | ServiceError::ConfigValidationError { .. }
            | ServiceError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ServiceError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ServiceError::InvalidRequest { .. } => "Check that the request carries every required field",
            ServiceError::UnknownCode { .. } => "Ask the student to visit the treasury office",
            ServiceError::GradeDenied { .. } => "This grade is served at the assisted counter",
            ServiceError::GatewayError(_) | ServiceError::GatewayStatus { .. } => {
                "Make sure the student directory service is running and reachable"
            }
            ServiceError::EncodingFault { .. } => "Verify the student record has a name",
            ServiceError::DispatchFailure { .. } => {
                "Check the printer share name and that the printer is powered on"
            }
            ServiceError::IoError(_) => "Check disk space and permissions on the staging directory",
            ServiceError::ConfigError { .. }
            | ServiceError::ConfigValidationError { .. }
            | ServiceError::InvalidConfigValueError { .. } => {
                "Review the configuration file against the documented options"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ServiceError::InvalidRequest { message } => message.clone(),
            ServiceError::UnknownCode { .. } => "Code not found or not valid".to_string(),
            ServiceError::GradeDenied { grade } => {
                format!("ACCESS DENIED: grade {} cannot use this system", grade)
            }
            ServiceError::GatewayError(_) | ServiceError::GatewayStatus { .. } => {
                "Could not reach the verification server".to_string()
            }
            ServiceError::EncodingFault { .. } | ServiceError::DispatchFailure { .. } => {
                "The ticket could not be printed".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
