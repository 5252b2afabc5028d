use thiserror::Error;

#[derive(Error, Debug)]
pub enum LpError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    /// 單筆記錄無法解析；聚合階段只記錄警告並跳過
    #[error("Cannot parse {field} '{value}' for entity '{entity}' in {dataset}: {reason}")]
    InputParseError {
        dataset: String,
        entity: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read dataset {dataset}: {source}")]
    DatasetReadError {
        dataset: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset {dataset} is not valid JSON: {source}")]
    DatasetFormatError {
        dataset: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset {dataset} is missing required key '{key}'")]
    MissingInputError { dataset: String, key: String },

    #[error("No entities survived aggregation; refusing to build an empty model")]
    EmptyModelError,

    #[error("Solver '{command}' failed: {reason}")]
    SolverInvocationError { command: String, reason: String },
}

pub type Result<T> = std::result::Result<T, LpError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Input,
    Model,
    Solver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LpError::ApiError(_) => ErrorCategory::Network,
            LpError::IoError(_) | LpError::CsvError(_) | LpError::DatasetReadError { .. } => {
                ErrorCategory::Storage
            }
            LpError::ConfigError { .. }
            | LpError::ConfigValidationError { .. }
            | LpError::InvalidConfigValueError { .. }
            | LpError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LpError::SerializationError(_)
            | LpError::DatasetFormatError { .. }
            | LpError::InputParseError { .. }
            | LpError::MissingInputError { .. } => ErrorCategory::Input,
            LpError::EmptyModelError => ErrorCategory::Model,
            LpError::SolverInvocationError { .. } => ErrorCategory::Solver,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LpError::InputParseError { .. } => ErrorSeverity::Low,
            LpError::ApiError(_) | LpError::SolverInvocationError { .. } => ErrorSeverity::Medium,
            LpError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LpError::ApiError(_) => {
                "Check the dataset endpoint URL and network connectivity, then retry".to_string()
            }
            LpError::CsvError(_) | LpError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            LpError::SerializationError(_) | LpError::DatasetFormatError { .. } => {
                "Make sure the dataset file is valid JSON".to_string()
            }
            LpError::DatasetReadError { dataset, .. } => {
                format!("Check that '{}' exists and is readable", dataset)
            }
            LpError::ConfigError { .. } | LpError::ConfigValidationError { .. } => {
                "Review the configuration file syntax".to_string()
            }
            LpError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration", field)
            }
            LpError::MissingConfigError { field } => {
                format!("Add the '{}' field to the configuration", field)
            }
            LpError::InputParseError { .. } => {
                "The record was skipped; correct the source value to include it".to_string()
            }
            LpError::MissingInputError { key, .. } => {
                format!("Datasets must be JSON objects with a '{}' array", key)
            }
            LpError::EmptyModelError => {
                "Verify that the resources dataset contains parsable records".to_string()
            }
            LpError::SolverInvocationError { command, .. } => format!(
                "Make sure '{}' is installed and on PATH, or rerun with the solver disabled",
                command
            ),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download a dataset: {}", self),
            ErrorCategory::Storage => format!("Could not read or write a file: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Invalid input data: {}", self),
            ErrorCategory::Model => format!("Could not build the LP model: {}", self),
            ErrorCategory::Solver => format!("Solver run failed: {}", self),
        }
    }

    /// 依嚴重程度決定程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}
