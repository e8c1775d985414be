use crate::api::ApiError;
use crate::domain::validation::ValidationError;
use thiserror::Error;

/// COVID dashboard application error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid configuration value for {key}: {source}")]
    InvalidSetting {
        key: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_setting(key: &'static str, source: ValidationError) -> Self {
        Self::InvalidSetting { key, source }
    }
}

/// Why an annotation was not stored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitAnnotationError {
    /// Rejected locally; no request was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The write request failed; the caller may resubmit
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitAnnotationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
