use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Dataset not found: {path}")]
    DatasetNotFound { path: String },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Dataset is missing required column(s): {}", .missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("Failed to render chart '{chart}': {reason}")]
    RenderError { chart: String, reason: String },

    #[error("All {attempted} chart(s) failed to render")]
    NoChartsRendered { attempted: usize },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
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
    Input,
    Data,
    Rendering,
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

impl ReportError {
    pub fn render(chart: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::RenderError {
            chart: chart.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::DatasetNotFound { .. } => ErrorCategory::Input,
            ReportError::MalformedRecord { .. }
            | ReportError::SchemaError { .. }
            | ReportError::CsvError(_) => ErrorCategory::Data,
            ReportError::RenderError { .. } | ReportError::NoChartsRendered { .. } => {
                ErrorCategory::Rendering
            }
            ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ReportError::IoError(_) | ReportError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一圖表失敗不影響其他圖表
            ReportError::RenderError { .. } => ErrorSeverity::Low,
            ReportError::NoChartsRendered { .. } => ErrorSeverity::Medium,
            ReportError::DatasetNotFound { .. }
            | ReportError::MalformedRecord { .. }
            | ReportError::SchemaError { .. }
            | ReportError::CsvError(_) => ErrorSeverity::High,
            ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::IoError(_)
            | ReportError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for this error, following the severity ladder
    /// shared by both binaries. Never 0: a run that ends in an error fails.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReportError::DatasetNotFound { path } => {
                format!("Check that '{}' exists or pass --data-path", path)
            }
            ReportError::MalformedRecord { .. } => {
                "Fix the offending row or rerun with --on-malformed-row skip".to_string()
            }
            ReportError::SchemaError { .. } => {
                "Make sure the CSV header has job_title, salary_in_usd, company_location, \
                 experience_level, company_size, employment_type and year"
                    .to_string()
            }
            ReportError::RenderError { .. } | ReportError::NoChartsRendered { .. } => {
                "Check that the output directory is writable and the styling options are valid"
                    .to_string()
            }
            ReportError::CsvError(_) => "Make sure the dataset is valid comma separated text".to_string(),
            ReportError::IoError(_) => "Check file permissions and available disk space".to_string(),
            ReportError::SerializationError(_) => "Rerun without --json".to_string(),
            ReportError::ConfigValidationError { field, .. }
            | ReportError::InvalidConfigValueError { field, .. } => {
                format!("Review the '{}' setting", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReportError::DatasetNotFound { path } => format!("Could not find the dataset at {}", path),
            ReportError::MalformedRecord { line, reason } => {
                format!("Row {} of the dataset is invalid ({})", line, reason)
            }
            ReportError::NoChartsRendered { attempted } => {
                format!("None of the {} charts could be written", attempted)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
