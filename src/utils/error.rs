use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Duplicate product id: {id}")]
    DuplicateProduct { id: i32 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Enrichment endpoint {endpoint} returned status {status}")]
    EnrichmentStatus { endpoint: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Network,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 結束碼；只有 Low 視為成功
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl CatalogError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::Storage { .. }
            | CatalogError::DuplicateProduct { .. }
            | CatalogError::IoError(_) => ErrorCategory::Storage,
            CatalogError::Http(_) | CatalogError::EnrichmentStatus { .. } => {
                ErrorCategory::Network
            }
            CatalogError::SerializationError(_)
            | CatalogError::CsvError(_)
            | CatalogError::ValidationError { .. } => ErrorCategory::Data,
            CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常重試即可
            CatalogError::Http(_) | CatalogError::EnrichmentStatus { .. } => {
                ErrorSeverity::Medium
            }
            // 被拒絕的輸入必須讓呼叫端看得到失敗
            CatalogError::ValidationError { .. }
            | CatalogError::DuplicateProduct { .. }
            | CatalogError::SerializationError(_)
            | CatalogError::CsvError(_) => ErrorSeverity::High,
            CatalogError::Storage { .. }
            | CatalogError::IoError(_)
            | CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CatalogError::Http(_) | CatalogError::EnrichmentStatus { .. } => {
                "Check that the enrichment service is reachable and retry".to_string()
            }
            CatalogError::DuplicateProduct { id } => {
                format!("Remove the duplicate row with id {} from the seed file", id)
            }
            CatalogError::SerializationError(_) | CatalogError::CsvError(_) => {
                "Check the seed file format (JSON array or CSV with a header row)".to_string()
            }
            CatalogError::IoError(_) => "Check file paths and permissions".to_string(),
            CatalogError::InvalidConfigValueError { field, .. }
            | CatalogError::ConfigValidationError { field, .. }
            | CatalogError::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the configuration file", field)
            }
            CatalogError::ConfigError { .. } => "Review the configuration file".to_string(),
            CatalogError::Storage { .. } => "Restart with a valid product store".to_string(),
            CatalogError::ValidationError { .. } => "Correct the input and retry".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Storage => format!("Product store failure: {}", self),
            ErrorCategory::Network => format!("Enrichment service unavailable: {}", self),
            ErrorCategory::Data => format!("Invalid data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
