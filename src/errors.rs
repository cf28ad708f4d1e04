use serde::Serialize;

use crate::config::AppConfigError;

#[derive(Debug, thiserror::Error, Serialize)]
pub enum AnalyticsError {
    #[error("IO error: {0}")]
    Io(
        #[from]
        #[serde(skip)]
        std::io::Error,
    ),

    #[error("CSV error: {0}")]
    Csv(
        #[from]
        #[serde(skip)]
        csv::Error,
    ),

    #[error("Serialization error: {0}")]
    Serialization(
        #[from]
        #[serde(skip)]
        serde_json::Error,
    ),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    Config(
        #[from]
        #[serde(skip)]
        AppConfigError,
    ),
}

impl From<validator::ValidationErrors> for AnalyticsError {
    fn from(err: validator::ValidationErrors) -> Self {
        AnalyticsError::ValidationError(err.to_string())
    }
}

impl AnalyticsError {
    /// Wraps any displayable plotting failure.
    pub fn render<E: std::fmt::Display>(error: E) -> Self {
        AnalyticsError::Render(error.to_string())
    }

    /// Returns the process exit code for this error.
    /// This is the single source of truth for error-to-exit-code mapping.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::ValidationError(_) => 2,
            Self::InvalidInput(_) => 3,
            Self::Io(_) | Self::Csv(_) | Self::Serialization(_) => 4,
            Self::Render(_) => 5,
        }
    }

    /// Short machine-readable kind, used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Csv(_) => "csv",
            Self::Serialization(_) => "serialization",
            Self::Render(_) => "render",
            Self::InvalidInput(_) => "invalid_input",
            Self::ValidationError(_) => "validation",
            Self::Config(_) => "config",
        }
    }
}
