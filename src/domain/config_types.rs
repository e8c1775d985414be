//! Type-safe configuration types
//!
//! Raw settings are converted into these at startup so that a bad value is
//! reported once, against the key it came from.

use crate::domain::validation::ValidationError;
use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root URL of the dashboard REST API, without a trailing slash
#[nutype(
    sanitize(trim, with = |s: String| s.trim_end_matches('/').to_string()),
    validate(not_empty, len_char_max = 2048, predicate = |s: &str| {
        (s.starts_with("http://") || s.starts_with("https://"))
            && !s.contains(char::is_whitespace)
    }),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::try_new(raw.to_string()).map_err(|_| ValidationError::InvalidBaseUrl(raw.to_string()))
    }

    /// Absolute URL for an API path such as `/health`
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.as_ref(), path.trim_start_matches('/'))
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self::try_new("http://localhost:8000".to_string()).expect("Default base URL is valid")
    }
}

/// Interval between two polls, in whole seconds
#[nutype(
    validate(predicate = |secs| *secs > 0 && *secs <= 86_400),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct PollInterval(u64);

impl PollInterval {
    pub fn from_secs(secs: u64) -> Result<Self, ValidationError> {
        Self::try_new(secs).map_err(|_| ValidationError::InvalidPollInterval)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.into_inner())
    }

    pub fn health_default() -> Self {
        Self::try_new(30).expect("Default health interval is valid")
    }

    pub fn annotations_default() -> Self {
        Self::try_new(45).expect("Default annotation interval is valid")
    }
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_base_url_validation() {
        assert!(BaseUrl::parse("http://localhost:8000").is_ok());
        assert!(BaseUrl::parse("https://dashboard.example.com").is_ok());
        assert!(BaseUrl::parse("").is_err());
        assert!(BaseUrl::parse("localhost:8000").is_err());
        assert!(BaseUrl::parse("http://bad host").is_err());
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let url = BaseUrl::parse(" http://localhost:8000/ ").unwrap();
        assert_eq!(url.as_ref(), "http://localhost:8000");
        assert_eq!(url.join("/health"), "http://localhost:8000/health");
        assert_eq!(url.join("covid/summary"), "http://localhost:8000/covid/summary");
    }

    #[test]
    fn test_poll_interval_validation() {
        assert_eq!(PollInterval::from_secs(0), Err(ValidationError::InvalidPollInterval));
        assert_eq!(
            PollInterval::from_secs(30).unwrap().as_duration(),
            Duration::from_secs(30)
        );
        assert!(PollInterval::from_secs(86_401).is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("INFO").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(BaseUrl::default().as_ref(), "http://localhost:8000");
        assert_eq!(*PollInterval::health_default().as_ref(), 30);
        assert_eq!(*PollInterval::annotations_default().as_ref(), 45);
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
