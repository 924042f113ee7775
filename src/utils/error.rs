use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Input file not found: {path}")]
    SourceNotFound { path: String },

    #[error("CSV processing error: {0}")]
    ParseError(#[from] csv::Error),

    #[error("Column '{column}' not found in input (available: {})", .available.join(", "))]
    SchemaError {
        column: String,
        available: Vec<String>,
    },

    #[error("Storage error: {0}")]
    StorageError(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SourceNotFound { .. }
            | EtlError::ParseError(_)
            | EtlError::SchemaError { .. } => ErrorCategory::Input,
            EtlError::StorageError(_) => ErrorCategory::Storage,
            EtlError::HttpClientError(_) => ErrorCategory::Network,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::SourceNotFound { .. } => {
                "Check the input path (--input or [input].path)".to_string()
            }
            EtlError::ParseError(_) => {
                "Make sure the input is delimiter-separated text with a header row".to_string()
            }
            EtlError::SchemaError { column, .. } => format!(
                "Add a '{}' column to the input or set [input].column",
                column
            ),
            EtlError::StorageError(_) => {
                "Check that the database file is writable and not locked by another process"
                    .to_string()
            }
            EtlError::HttpClientError(_) => "Check the TLS setup and network access".to_string(),
            EtlError::IoError(_) => "Check file permissions and free disk space".to_string(),
            EtlError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or pass it as a flag", field)
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not read the postal code input: {}", self),
            ErrorCategory::Storage => format!("Could not access the postal code database: {}", self),
            ErrorCategory::Network => format!("Could not set up the lookup client: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
