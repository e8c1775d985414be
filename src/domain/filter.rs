//! User-selected filters for an update cycle
//!
//! A [`FilterRequest`] is what the caller hands in: possibly blank country
//! names, a year and an optional explicit date range. Resolving it produces a
//! [`Filter`] whose invariants (non-empty, deduplicated selection; ordered
//! date range) hold for the rest of the cycle.

use crate::domain::types::{CountryName, Year};
use crate::domain::validation::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Countries shown when the user has not selected any
pub const STANDARD_GROUP: [&str; 5] = ["Germany", "France", "Italy", "Spain", "United Kingdom"];

/// Which cumulative counter a summary is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Cases,
    Confirmed,
    #[default]
    Deaths,
    Recovered,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Cases => "cases",
            CaseType::Confirmed => "confirmed",
            CaseType::Deaths => "deaths",
            CaseType::Recovered => "recovered",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaseType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cases" => Ok(CaseType::Cases),
            "confirmed" => Ok(CaseType::Confirmed),
            "deaths" => Ok(CaseType::Deaths),
            "recovered" => Ok(CaseType::Recovered),
            _ => Err(ValidationError::UnknownCaseType(s.to_string())),
        }
    }
}

/// Inclusive date range with `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// January 1st through December 31st of `year`
    pub fn for_year(year: Year) -> Self {
        let year = year.into_inner();
        // Year is bounded to 2020..=2100, so both dates exist
        let from = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
        let to = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
        Self { from, to }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// Non-empty, order-preserving, case-insensitively deduplicated set of countries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct CountrySelection(Vec<CountryName>);

impl CountrySelection {
    /// Build a selection from raw names; blank entries are skipped
    pub fn from_names<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<CountryName> = Vec::new();
        for raw in names {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            let name = CountryName::parse(raw)?;
            if !selected.iter().any(|existing| existing.matches(name.as_ref())) {
                selected.push(name);
            }
        }
        if selected.is_empty() {
            return Err(ValidationError::NoCountrySelected);
        }
        Ok(Self(selected))
    }

    /// Like [`CountrySelection::from_names`], but an empty selection falls back to `defaults`
    pub fn or_default<I, S>(names: I, defaults: &CountrySelection) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match Self::from_names(names) {
            Err(ValidationError::NoCountrySelected) => Ok(defaults.clone()),
            other => other,
        }
    }

    pub fn standard() -> Self {
        Self(
            STANDARD_GROUP
                .iter()
                .filter_map(|name| CountryName::parse(name).ok())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&CountryName> {
        self.0.first()
    }

    pub fn contains(&self, country: &str) -> bool {
        self.0.iter().any(|name| name.matches(country))
    }

    /// Comma-joined form used by the aggregate endpoints
    pub fn to_query_value(&self) -> String {
        self.0
            .iter()
            .map(|name| name.as_ref())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<Vec<String>> for CountrySelection {
    type Error = ValidationError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_names(names)
    }
}

impl<'a> IntoIterator for &'a CountrySelection {
    type Item = &'a CountryName;
    type IntoIter = std::slice::Iter<'a, CountryName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Raw filter input as it arrives from the caller
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterRequest {
    pub countries: Vec<String>,
    pub year: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub case_type: Option<CaseType>,
}

impl FilterRequest {
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn with_case_type(mut self, case_type: CaseType) -> Self {
        self.case_type = Some(case_type);
        self
    }
}

/// Defaults substituted into a [`FilterRequest`] while resolving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefaults {
    pub countries: CountrySelection,
    pub year: Year,
    pub case_type: CaseType,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            countries: CountrySelection::standard(),
            year: Year::try_new(2021).expect("Default year is valid"),
            case_type: CaseType::default(),
        }
    }
}

/// Fully resolved filter for one update cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    countries: CountrySelection,
    year: Year,
    date_range: DateRange,
    case_type: CaseType,
}

impl Filter {
    pub fn new(
        countries: CountrySelection,
        year: Year,
        date_range: DateRange,
        case_type: CaseType,
    ) -> Self {
        Self {
            countries,
            year,
            date_range,
            case_type,
        }
    }

    /// Resolve a request against defaults.
    ///
    /// An empty country selection becomes the default group. When only a year
    /// is given the date range spans that year; when only a range is given the
    /// year is taken from its start. A single bound is paired with the other
    /// end of its year.
    pub fn resolve(request: &FilterRequest, defaults: &FilterDefaults) -> Result<Self, ValidationError> {
        let countries = CountrySelection::or_default(&request.countries, &defaults.countries)?;

        let (year, date_range) = match (request.year, request.date_from, request.date_to) {
            (year, Some(from), Some(to)) => {
                let range = DateRange::new(from, to)?;
                let year = match year {
                    Some(raw) => Year::parse(raw)?,
                    None => Year::parse(from.year())?,
                };
                (year, range)
            }
            (year, Some(from), None) => {
                let year = Year::parse(year.unwrap_or(from.year()))?;
                (year, DateRange::new(from, DateRange::for_year(year).to())?)
            }
            (year, None, Some(to)) => {
                let year = Year::parse(year.unwrap_or(to.year()))?;
                (year, DateRange::new(DateRange::for_year(year).from(), to)?)
            }
            (Some(raw), None, None) => {
                let year = Year::parse(raw)?;
                (year, DateRange::for_year(year))
            }
            (None, None, None) => (defaults.year, DateRange::for_year(defaults.year)),
        };

        Ok(Self {
            countries,
            year,
            date_range,
            case_type: request.case_type.unwrap_or(defaults.case_type),
        })
    }

    pub fn countries(&self) -> &CountrySelection {
        &self.countries
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn case_type(&self) -> CaseType {
        self.case_type
    }
}
