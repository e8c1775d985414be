//! Boundary to the dashboard REST API
//!
//! The orchestrator only sees [`DashboardApi`]; [`HttpDashboardApi`] is the
//! production implementation and tests substitute scripted doubles.

pub mod constants;
pub mod error;
pub mod http;
pub(crate) mod wire;

pub use error::ApiError;
pub use http::HttpDashboardApi;

use crate::domain::annotation::{Annotation, NewAnnotation};
use crate::domain::filter::CountrySelection;
use crate::domain::health::HealthStatus;
use crate::domain::metadata::{CountryMetadata, UpsertOutcome};
use crate::domain::mortality::MortalityAnalytics;
use crate::domain::prediction::PredictionResult;
use crate::domain::series::CountrySeries;
use crate::domain::summary::{SummaryQuery, SummaryRow};
use crate::domain::types::{AnnotationId, AnnotationLimit, CountryName, DashboardId, DaysAhead, Year};
use async_trait::async_trait;

/// One method per endpoint of the dashboard API
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /covid/daily_deaths`
    async fn daily_deaths(&self, country: &CountryName, year: Year) -> Result<CountrySeries, ApiError>;

    /// `GET /analytics/mortality-vs-gdp` for all selected countries at once
    async fn mortality_vs_gdp(
        &self,
        year: Year,
        countries: &CountrySelection,
    ) -> Result<MortalityAnalytics, ApiError>;

    /// `GET /covid/summary`
    async fn summary(&self, query: &SummaryQuery) -> Result<SummaryRow, ApiError>;

    /// `GET /analytics/predict-infections`
    async fn predict_infections(
        &self,
        country: &CountryName,
        days_ahead: DaysAhead,
    ) -> Result<PredictionResult, ApiError>;

    /// `GET /health`
    async fn health(&self, verbose: bool) -> Result<HealthStatus, ApiError>;

    /// `GET /annotations`
    async fn list_annotations(
        &self,
        dashboard_id: &DashboardId,
        limit: AnnotationLimit,
    ) -> Result<Vec<Annotation>, ApiError>;

    /// `POST /annotations`
    async fn create_annotation(&self, annotation: &NewAnnotation) -> Result<AnnotationId, ApiError>;

    /// `POST /metadata/country`
    async fn upsert_country_metadata(
        &self,
        metadata: &CountryMetadata,
    ) -> Result<UpsertOutcome, ApiError>;
}
