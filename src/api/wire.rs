//! JSON shapes of the dashboard API and their conversion into domain types
//!
//! These structs mirror the server's responses loosely: unknown fields are
//! ignored and optional fields default, so additive server changes do not
//! break decoding. Anything that survives decoding but cannot be represented
//! in the domain becomes [`ApiError::InvalidPayload`].

use crate::api::constants::endpoints;
use crate::api::error::ApiError;
use crate::domain::annotation::{Annotation, NewAnnotation};
use crate::domain::health::{DataSourceHealth, HealthStatus, SourceHealth};
use crate::domain::metadata::{CountryMetadata, UpsertOutcome};
use crate::domain::mortality::{MortalityAnalytics, MortalitySample};
use crate::domain::prediction::{ForecastPoint, PredictionResult};
use crate::domain::series::{CountrySeries, DailySeriesPoint};
use crate::domain::summary::{SummaryQuery, SummaryRow};
use crate::domain::types::{
    AnnotationId, AnnotationText, AuthorName, CountryName, DashboardId, ModelName, Tag,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// daily deaths

#[derive(Debug, Deserialize)]
pub(crate) struct DailyDeathsBody {
    #[serde(default)]
    pub series: Vec<DailyPointBody>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyPointBody {
    pub date: NaiveDate,
    pub deaths: Option<f64>,
}

impl DailyDeathsBody {
    /// Null or non-finite counts are skipped; negative corrections clamp to zero
    pub fn into_series(self, country: CountryName) -> CountrySeries {
        let points = self
            .series
            .into_iter()
            .filter_map(|point| {
                let deaths = point.deaths.filter(|d| d.is_finite())?;
                Some(DailySeriesPoint {
                    date: point.date,
                    deaths: deaths.max(0.0).round() as u64,
                })
            })
            .collect();
        CountrySeries::new(country, points)
    }
}

// mortality vs gdp

#[derive(Debug, Deserialize)]
pub(crate) struct MortalityBody {
    pub year: i32,
    #[serde(default)]
    pub n_countries: u32,
    #[serde(default)]
    pub pearson_corr: Option<f64>,
    #[serde(default)]
    pub slope_per_1k_gdp: Option<f64>,
    #[serde(default)]
    pub sample: Vec<MortalitySampleBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MortalitySampleBody {
    pub country: String,
    #[serde(default)]
    pub deaths_per_100k: Option<f64>,
    #[serde(default)]
    pub gdp_per_capita: Option<f64>,
    #[serde(default)]
    pub population: Option<f64>,
}

impl MortalityBody {
    /// Records with an unusable country name are dropped
    pub fn into_domain(self) -> MortalityAnalytics {
        let samples: Vec<MortalitySample> = self
            .sample
            .into_iter()
            .filter_map(|raw| {
                let country = CountryName::parse(&raw.country).ok()?;
                Some(MortalitySample::from_raw(
                    country,
                    raw.deaths_per_100k,
                    raw.gdp_per_capita,
                    raw.population,
                ))
            })
            .collect();
        MortalityAnalytics {
            year: self.year,
            n_countries: self.n_countries,
            pearson_corr: self.pearson_corr.filter(|r| r.is_finite()),
            slope_per_1k_gdp: self.slope_per_1k_gdp.filter(|s| s.is_finite()),
            samples,
        }
    }
}

// summary

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryBody {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SummaryBody {
    /// A body carrying `error`, or lacking a numeric value, is a failed row
    pub fn into_row(self, query: &SummaryQuery) -> Result<SummaryRow, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::invalid_payload(endpoints::SUMMARY, error));
        }
        let value = self
            .value
            .filter(|v| v.is_finite())
            .ok_or_else(|| ApiError::invalid_payload(endpoints::SUMMARY, "missing value"))?;
        Ok(SummaryRow {
            country: query.country.clone(),
            case_type: query.case_type,
            range: query.range,
            value,
        })
    }
}

// prediction

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionBody {
    pub country: String,
    pub model: String,
    pub last_observed_date: NaiveDate,
    pub last_observed_value: f64,
    #[serde(default)]
    pub predictions: Vec<ForecastPointBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastPointBody {
    pub date: NaiveDate,
    pub predicted_cases: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

impl PredictionBody {
    pub fn into_domain(self) -> Result<PredictionResult, ApiError> {
        let endpoint = endpoints::PREDICT_INFECTIONS;
        let country = CountryName::parse(&self.country)
            .map_err(|e| ApiError::invalid_payload(endpoint, e.to_string()))?;
        let model = ModelName::try_new(self.model)
            .map_err(|_| ApiError::invalid_payload(endpoint, "missing model name"))?;
        let points = self
            .predictions
            .into_iter()
            .map(|p| ForecastPoint {
                date: p.date,
                predicted_cases: p.predicted_cases,
                confidence_lower: p.confidence_lower,
                confidence_upper: p.confidence_upper,
            })
            .collect();
        PredictionResult::new(
            country,
            model,
            self.last_observed_date,
            self.last_observed_value,
            points,
        )
        .map_err(|e| ApiError::invalid_payload(endpoint, e.to_string()))
    }
}

// health

#[derive(Debug, Deserialize)]
pub(crate) struct HealthBody {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub snowflake: Option<SourceBody>,
    #[serde(default)]
    pub mongodb: Option<SourceBody>,
    #[serde(default)]
    pub overall_status: Option<String>,
    /// Only present on verbose checks while the warehouse is up
    #[serde(default)]
    pub data_sources: Option<BTreeMap<String, DataSourceBody>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataSourceBody {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<DataSourceBody> for DataSourceHealth {
    fn from(body: DataSourceBody) -> Self {
        if body.available {
            DataSourceHealth::Available {
                row_count: body.row_count.unwrap_or_default(),
            }
        } else {
            DataSourceHealth::Unavailable { error: body.error }
        }
    }
}

/// A data source reported either as a bare flag or as an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SourceBody {
    Flag(bool),
    Detailed {
        status: bool,
        #[serde(default)]
        error: Option<String>,
    },
}

impl SourceBody {
    fn into_health(self) -> SourceHealth {
        match self {
            SourceBody::Flag(true) | SourceBody::Detailed { status: true, .. } => SourceHealth::Up,
            SourceBody::Flag(false) => SourceHealth::Down { reason: None },
            SourceBody::Detailed {
                status: false,
                error,
            } => SourceHealth::Down { reason: error },
        }
    }
}

impl HealthBody {
    /// A source missing from the body counts as down. The server's overall
    /// status is kept when it is recognised, otherwise it is derived.
    pub fn into_domain(self) -> HealthStatus {
        let source = |body: Option<SourceBody>| {
            body.map(SourceBody::into_health)
                .unwrap_or_else(|| SourceHealth::Down {
                    reason: Some("not reported".to_string()),
                })
        };
        let mut status = HealthStatus::new(source(self.snowflake), source(self.mongodb));
        if let Some(version) = self.version {
            status = status.with_version(version);
        }
        if let Some(checked_at) = self.timestamp.as_deref().and_then(parse_timestamp) {
            status = status.with_checked_at(checked_at);
        }
        if let Some(overall) = self.overall_status.and_then(|raw| raw.parse().ok()) {
            status = status.with_overall(overall);
        }
        for (table, body) in self.data_sources.into_iter().flatten() {
            status = status.with_data_source(table, body.into());
        }
        status
    }
}

// annotations

#[derive(Debug, Deserialize)]
pub(crate) struct AnnotationListBody {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

impl AnnotationListBody {
    /// Documents are decoded one by one; a malformed or invalid document is
    /// dropped without affecting the rest of the feed
    pub fn into_domain(self, fallback_dashboard: &DashboardId) -> Vec<Annotation> {
        self.items
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<AnnotationBody>(raw).ok())
            .filter_map(|item| item.into_domain(fallback_dashboard))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnnotationBody {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub dashboard_id: Option<String>,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub tags: Option<Vec<Option<String>>>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl AnnotationBody {
    /// `None` for stored documents that would not pass local validation
    pub fn into_domain(self, fallback_dashboard: &DashboardId) -> Option<Annotation> {
        let dashboard_id = self
            .dashboard_id
            .and_then(|raw| DashboardId::parse(&raw).ok())
            .unwrap_or_else(|| fallback_dashboard.clone());
        let tags: BTreeSet<Tag> = self
            .tags
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(|raw| Tag::try_new(raw).ok())
            .collect();
        Some(Annotation {
            id: self.id.and_then(|raw| AnnotationId::try_new(raw).ok()),
            dashboard_id,
            author: AuthorName::try_new(self.author).ok()?,
            text: AnnotationText::try_new(self.text).ok()?,
            tags,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewAnnotationBody<'a> {
    pub dashboard_id: &'a str,
    pub author: &'a str,
    pub text: &'a str,
    pub tags: Vec<&'a str>,
}

impl<'a> From<&'a NewAnnotation> for NewAnnotationBody<'a> {
    fn from(annotation: &'a NewAnnotation) -> Self {
        Self {
            dashboard_id: annotation.dashboard_id.as_ref(),
            author: annotation.author.as_ref(),
            text: annotation.text.as_ref(),
            tags: annotation.tags.iter().map(|tag| tag.as_ref()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InsertedBody {
    pub inserted_id: String,
}

impl InsertedBody {
    pub fn into_id(self) -> Result<AnnotationId, ApiError> {
        AnnotationId::try_new(self.inserted_id)
            .map_err(|_| ApiError::invalid_payload(endpoints::CREATE_ANNOTATION, "empty inserted_id"))
    }
}

// country metadata

#[derive(Debug, Serialize)]
pub(crate) struct CountryMetadataBody<'a> {
    pub country: &'a str,
    pub gdp_per_capita: f64,
    pub population: u64,
}

impl<'a> From<&'a CountryMetadata> for CountryMetadataBody<'a> {
    fn from(metadata: &'a CountryMetadata) -> Self {
        Self {
            country: metadata.country.as_ref(),
            gdp_per_capita: metadata.gdp_per_capita.into_inner(),
            population: metadata.population.into_inner(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpsertBody {
    #[serde(default)]
    pub matched: u64,
    #[serde(default)]
    pub modified: u64,
    #[serde(default)]
    pub upserted_id: Option<String>,
}

impl From<UpsertBody> for UpsertOutcome {
    fn from(body: UpsertBody) -> Self {
        Self {
            matched: body.matched,
            modified: body.modified,
            upserted_id: body
                .upserted_id
                .and_then(|raw| AnnotationId::try_new(raw).ok()),
        }
    }
}

// timestamps

/// Accepts RFC 3339 as well as naive ISO-8601 timestamps, which are taken as UTC
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
