//! Validated value types shared across the dashboard domain
//!
//! Newtypes keep raw strings and numbers from leaking past the API boundary;
//! each one validates on construction.

use crate::domain::validation::{ValidationError, ANNOTATION_LIMIT_DEFAULT, DAYS_AHEAD_DEFAULT};
use nutype::nutype;
#[allow(unused_imports)] // These are used by nutype derive macros
use serde::{Deserialize, Serialize};

/// Country name as understood by the warehouse (e.g. "Germany")
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 100),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct CountryName(String);

impl CountryName {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::try_new(raw.to_string()).map_err(|_| ValidationError::InvalidCountry(raw.to_string()))
    }

    /// Case-insensitive comparison; the warehouse matches on `UPPER(...)`
    pub fn matches(&self, other: &str) -> bool {
        self.as_ref().eq_ignore_ascii_case(other.trim())
    }
}

/// Dashboard whose annotations are read and written
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 100, predicate = |s: &str| s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')),
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
pub struct DashboardId(String);

impl DashboardId {
    pub const DEFAULT: &'static str = "covid_dashboard";

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::try_new(raw.to_string())
            .map_err(|_| ValidationError::InvalidDashboardId(raw.to_string()))
    }
}

impl Default for DashboardId {
    fn default() -> Self {
        Self::try_new(Self::DEFAULT.to_string()).expect("Default dashboard id is valid")
    }
}

/// Annotation author; blank after trimming is rejected
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 200),
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
pub struct AuthorName(String);

/// Annotation body; blank after trimming is rejected
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 5000),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct AnnotationText(String);

/// Free-form label attached to an annotation
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 50, predicate = |s: &str| !s
        .chars()
        .any(char::is_whitespace)),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct Tag(String);

/// Identifier the document store assigned to a stored annotation
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
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
pub struct AnnotationId(String);

/// Forecasting model identifier reported by the server (e.g. "ARIMA(2,1,2)")
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 200),
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
pub struct ModelName(String);

/// Calendar year used by the yearly endpoints
#[nutype(
    validate(greater_or_equal = 2020, less_or_equal = 2100),
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
pub struct Year(i32);

impl Year {
    pub fn parse(raw: i32) -> Result<Self, ValidationError> {
        Self::try_new(raw).map_err(|_| ValidationError::YearOutOfRange(raw))
    }
}

/// Number of days the forecast extends past the last observation
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 30),
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
pub struct DaysAhead(u32);

impl DaysAhead {
    pub fn parse(raw: u32) -> Result<Self, ValidationError> {
        Self::try_new(raw).map_err(|_| ValidationError::DaysAheadOutOfRange(raw))
    }
}

impl Default for DaysAhead {
    fn default() -> Self {
        Self::try_new(DAYS_AHEAD_DEFAULT).expect("Default forecast horizon is valid")
    }
}

/// Maximum number of annotations requested per poll
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 1000),
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
pub struct AnnotationLimit(u32);

impl AnnotationLimit {
    pub fn parse(raw: u32) -> Result<Self, ValidationError> {
        Self::try_new(raw).map_err(|_| ValidationError::AnnotationLimitOutOfRange(raw))
    }
}

impl Default for AnnotationLimit {
    fn default() -> Self {
        Self::try_new(ANNOTATION_LIMIT_DEFAULT).expect("Default annotation limit is valid")
    }
}

/// Deaths per 100,000 inhabitants
#[nutype(
    validate(finite, greater_or_equal = 0.0),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Display)
)]
pub struct DeathsPer100k(f64);

/// GDP per capita in USD
#[nutype(
    validate(finite, greater_or_equal = 0.0),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Display)
)]
pub struct GdpPerCapita(f64);

/// Resident population; always positive
#[nutype(
    validate(greater = 0),
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
pub struct Population(u64);
