//! `reqwest` implementation of [`DashboardApi`]

use crate::api::constants::{endpoints, paths, query, DEFAULT_USER_AGENT};
use crate::api::error::ApiError;
use crate::api::wire::{
    AnnotationListBody, CountryMetadataBody, DailyDeathsBody, HealthBody, InsertedBody,
    MortalityBody, NewAnnotationBody, PredictionBody, SummaryBody, UpsertBody,
};
use crate::api::DashboardApi;
use crate::domain::annotation::{Annotation, NewAnnotation};
use crate::domain::config_types::BaseUrl;
use crate::domain::filter::CountrySelection;
use crate::domain::health::HealthStatus;
use crate::domain::metadata::{CountryMetadata, UpsertOutcome};
use crate::domain::mortality::MortalityAnalytics;
use crate::domain::prediction::PredictionResult;
use crate::domain::series::CountrySeries;
use crate::domain::summary::{SummaryQuery, SummaryRow};
use crate::domain::types::{AnnotationId, AnnotationLimit, CountryName, DashboardId, DaysAhead, Year};
use crate::infrastructure::log_messages;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// HTTP client for the dashboard API.
///
/// No timeout is configured here; requests use the transport default.
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: BaseUrl,
}

impl HttpDashboardApi {
    pub fn new(base_url: BaseUrl) -> Result<Self, reqwest::Error> {
        Self::with_user_agent(base_url, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(base_url: BaseUrl, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured client, e.g. one shared with other components
    pub fn with_client(client: reqwest::Client, base_url: BaseUrl) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn get_json<T>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.base_url.join(path))
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::transport(endpoint, &e))?;
        read_json(endpoint, response).await
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.base_url.join(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::transport(endpoint, &e))?;
        read_json(endpoint, response).await
    }
}

/// Non-success statuses become [`ApiError::Status`] carrying the body's `detail`
async fn read_json<T>(endpoint: &'static str, response: reqwest::Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::transport(endpoint, &e))?;

    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16(), &body));
    }

    serde_json::from_slice(&body).map_err(|e| ApiError::decode(endpoint, &e))
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    #[instrument(level = "debug", skip(self), fields(country = %country, year = %year))]
    async fn daily_deaths(&self, country: &CountryName, year: Year) -> Result<CountrySeries, ApiError> {
        let params = [
            (query::COUNTRY, country.to_string()),
            (query::YEAR, year.to_string()),
        ];
        let body: DailyDeathsBody = self
            .get_json(endpoints::DAILY_DEATHS, paths::DAILY_DEATHS, &params)
            .await?;
        if let Some(error) = &body.error {
            warn!(%country, %error, "{}", log_messages::fanout::SERVER_REPORTED_ERROR);
        }
        Ok(body.into_series(country.clone()))
    }

    #[instrument(level = "debug", skip(self, countries), fields(year = %year, countries = countries.len()))]
    async fn mortality_vs_gdp(
        &self,
        year: Year,
        countries: &CountrySelection,
    ) -> Result<MortalityAnalytics, ApiError> {
        let params = [
            (query::YEAR, year.to_string()),
            (query::COUNTRIES, countries.to_query_value()),
        ];
        let body: MortalityBody = self
            .get_json(endpoints::MORTALITY_VS_GDP, paths::MORTALITY_VS_GDP, &params)
            .await?;
        Ok(body.into_domain())
    }

    #[instrument(level = "debug", skip(self, request), fields(country = %request.country))]
    async fn summary(&self, request: &SummaryQuery) -> Result<SummaryRow, ApiError> {
        let params = [
            (query::COUNTRY, request.country.to_string()),
            (query::DATE_FROM, request.range.from().to_string()),
            (query::DATE_TO, request.range.to().to_string()),
            (query::CASE_TYPE, request.case_type.as_str().to_string()),
        ];
        let body: SummaryBody = self
            .get_json(endpoints::SUMMARY, paths::SUMMARY, &params)
            .await?;
        body.into_row(request)
    }

    #[instrument(level = "debug", skip(self), fields(country = %country, days_ahead = %days_ahead))]
    async fn predict_infections(
        &self,
        country: &CountryName,
        days_ahead: DaysAhead,
    ) -> Result<PredictionResult, ApiError> {
        let params = [
            (query::COUNTRY, country.to_string()),
            (query::DAYS_AHEAD, days_ahead.to_string()),
        ];
        let body: PredictionBody = self
            .get_json(endpoints::PREDICT_INFECTIONS, paths::PREDICT_INFECTIONS, &params)
            .await?;
        body.into_domain()
    }

    #[instrument(level = "debug", skip(self))]
    async fn health(&self, verbose: bool) -> Result<HealthStatus, ApiError> {
        let params = [(query::VERBOSE, u8::from(verbose).to_string())];
        let body: HealthBody = self
            .get_json(endpoints::HEALTH, paths::HEALTH, &params)
            .await?;
        Ok(body.into_domain())
    }

    #[instrument(level = "debug", skip(self), fields(dashboard_id = %dashboard_id, limit = %limit))]
    async fn list_annotations(
        &self,
        dashboard_id: &DashboardId,
        limit: AnnotationLimit,
    ) -> Result<Vec<Annotation>, ApiError> {
        let params = [
            (query::DASHBOARD_ID, dashboard_id.to_string()),
            (query::LIMIT, limit.to_string()),
        ];
        let body: AnnotationListBody = self
            .get_json(endpoints::LIST_ANNOTATIONS, paths::ANNOTATIONS, &params)
            .await?;

        let total = body.items.len();
        let items = body.into_domain(dashboard_id);
        if items.len() < total {
            debug!(
                skipped = total - items.len(),
                "{}",
                log_messages::annotations::SKIPPED_INVALID
            );
        }
        Ok(items)
    }

    #[instrument(level = "debug", skip(self, annotation), fields(dashboard_id = %annotation.dashboard_id))]
    async fn create_annotation(&self, annotation: &NewAnnotation) -> Result<AnnotationId, ApiError> {
        let body: InsertedBody = self
            .post_json(
                endpoints::CREATE_ANNOTATION,
                paths::ANNOTATIONS,
                &NewAnnotationBody::from(annotation),
            )
            .await?;
        body.into_id()
    }

    #[instrument(level = "debug", skip(self, metadata), fields(country = %metadata.country))]
    async fn upsert_country_metadata(
        &self,
        metadata: &CountryMetadata,
    ) -> Result<UpsertOutcome, ApiError> {
        let body: UpsertBody = self
            .post_json(
                endpoints::COUNTRY_METADATA,
                paths::COUNTRY_METADATA,
                &CountryMetadataBody::from(metadata),
            )
            .await?;
        Ok(body.into())
    }
}
