use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecsysError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to load data from {source_name}: {message}")]
    DataLoadError { source_name: String, message: String },

    #[error("Customer {customer_id} not found")]
    CustomerNotFound { customer_id: u64 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Launch step '{step}' failed: {message}")]
    LaunchError { step: String, message: String },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Lookup,
    Process,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RecsysError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RecsysError::ConfigValidationError { .. }
            | RecsysError::InvalidConfigValueError { .. }
            | RecsysError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RecsysError::CsvError(_)
            | RecsysError::DataLoadError { .. }
            | RecsysError::SerializationError(_)
            | RecsysError::ValidationError { .. } => ErrorCategory::Data,
            RecsysError::CustomerNotFound { .. } => ErrorCategory::Lookup,
            RecsysError::LaunchError { .. } => ErrorCategory::Process,
            RecsysError::ZipError(_) | RecsysError::IoError(_) | RecsysError::ServerError { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RecsysError::CustomerNotFound { .. } | RecsysError::ValidationError { .. } => {
                ErrorSeverity::Medium
            }
            RecsysError::ConfigValidationError { .. }
            | RecsysError::InvalidConfigValueError { .. }
            | RecsysError::MissingConfigError { .. }
            | RecsysError::CsvError(_)
            | RecsysError::DataLoadError { .. }
            | RecsysError::SerializationError(_)
            | RecsysError::LaunchError { .. } => ErrorSeverity::High,
            RecsysError::ZipError(_) | RecsysError::IoError(_) | RecsysError::ServerError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "檢查設定檔內容與欄位格式 (Check the configuration file)",
            ErrorCategory::Data => {
                "確認資料目錄中的 CSV 檔案存在且欄位正確，或執行 `generate` 產生範例資料"
            }
            ErrorCategory::Lookup => "確認顧客 ID 是否存在於資料集中 (Check the customer id)",
            ErrorCategory::Process => "確認外部指令已安裝並可執行 (Check the launcher commands)",
            ErrorCategory::System => "檢查檔案權限、磁碟空間與網路埠是否可用",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RecsysError::CustomerNotFound { customer_id } => {
                format!("Customer {} does not exist in the loaded dataset", customer_id)
            }
            RecsysError::DataLoadError { source_name, .. } => {
                format!("Could not load the {} dataset", source_name)
            }
            RecsysError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            RecsysError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecsysError>;
