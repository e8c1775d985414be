//! Local validation failures and the bounds they check
//!
//! Everything in here is caught before a request is issued.

use chrono::NaiveDate;
use thiserror::Error;

/// Earliest year the analytics endpoints accept
pub const YEAR_MIN: i32 = 2020;

/// Latest year the analytics endpoints accept
pub const YEAR_MAX: i32 = 2100;

/// Longest forecast horizon the prediction endpoint accepts
pub const DAYS_AHEAD_MAX: u32 = 30;

/// Forecast horizon used when none is configured
pub const DAYS_AHEAD_DEFAULT: u32 = 7;

/// Largest page of annotations the server will return
pub const ANNOTATION_LIMIT_MAX: u32 = 1000;

/// Page size used when none is configured
pub const ANNOTATION_LIMIT_DEFAULT: u32 = 100;

pub const COUNTRY_NAME_MAX_CHARS: usize = 100;
pub const AUTHOR_MAX_CHARS: usize = 200;
pub const ANNOTATION_TEXT_MAX_CHARS: usize = 5000;
pub const TAG_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Author must not be empty")]
    EmptyAuthor,

    #[error("Annotation text must not be empty")]
    EmptyText,

    #[error("Invalid country name: {0:?}")]
    InvalidCountry(String),

    #[error("No country selected and no default group configured")]
    NoCountrySelected,

    #[error("Date range is inverted: {from} is after {to}")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Year {0} is outside the supported range 2020..=2100")]
    YearOutOfRange(i32),

    #[error("Forecast horizon {0} is outside the supported range 1..=30")]
    DaysAheadOutOfRange(u32),

    #[error("Annotation limit {0} is outside the supported range 1..=1000")]
    AnnotationLimitOutOfRange(u32),

    #[error("Unknown case type: {0}")]
    UnknownCaseType(String),

    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),

    #[error("Invalid dashboard id: {0:?}")]
    InvalidDashboardId(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid country metadata: {field}")]
    InvalidMetadata { field: &'static str },

    #[error("Poll interval must be at least one second")]
    InvalidPollInterval,
}
