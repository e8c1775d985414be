//! Scripted in-memory [`DashboardApi`] for orchestrator tests
//!
//! Responses are scripted per endpoint (and per country where relevant);
//! anything unscripted answers with a 404. Every call is recorded, and an
//! optional gate holds calls open so tests can observe in-flight requests.

use crate::api::{ApiError, DashboardApi};
use crate::domain::annotation::{Annotation, NewAnnotation};
use crate::domain::filter::{CaseType, CountrySelection, STANDARD_GROUP};
use crate::domain::health::{HealthStatus, SourceHealth};
use crate::domain::metadata::{CountryMetadata, UpsertOutcome};
use crate::domain::mortality::{MortalityAnalytics, MortalitySample};
use crate::domain::prediction::{ForecastPoint, PredictionResult};
use crate::domain::series::{CountrySeries, DailySeriesPoint};
use crate::domain::summary::{SummaryQuery, SummaryRow};
use crate::domain::types::{
    AnnotationId, AnnotationLimit, CountryName, DashboardId, DaysAhead, ModelName, Year,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{watch, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DailyDeaths(String),
    MortalityVsGdp(Vec<String>),
    Summary { country: String, case_type: CaseType },
    PredictInfections { country: String, days_ahead: u32 },
    Health,
    ListAnnotations,
    CreateAnnotation,
    UpsertMetadata(String),
}

pub fn not_found(detail: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        detail: detail.to_string(),
    }
}

pub fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        detail: "Internal Server Error".to_string(),
    }
}

pub fn country(name: &str) -> CountryName {
    CountryName::parse(name).unwrap()
}

pub fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, month, day).unwrap()
}

pub fn series(name: &str, deaths: &[u64]) -> CountrySeries {
    let points = deaths
        .iter()
        .enumerate()
        .map(|(i, deaths)| DailySeriesPoint {
            date: day(1, 1) + Duration::days(i as i64),
            deaths: *deaths,
        })
        .collect();
    CountrySeries::new(country(name), points)
}

pub fn sample(name: &str, deaths: Option<f64>, gdp: Option<f64>, population: Option<f64>) -> MortalitySample {
    MortalitySample::from_raw(country(name), deaths, gdp, population)
}

pub fn analytics(samples: Vec<MortalitySample>) -> MortalityAnalytics {
    MortalityAnalytics {
        year: 2021,
        n_countries: samples.len() as u32,
        pearson_corr: Some(-0.3),
        slope_per_1k_gdp: Some(0.5),
        samples,
    }
}

pub fn annotation(author: &str, text: &str, hour: u32) -> Annotation {
    let draft = NewAnnotation::new(DashboardId::default(), author, text, ["note"]).unwrap();
    Annotation {
        id: AnnotationId::try_new(format!("id-{author}-{hour}")).ok(),
        dashboard_id: draft.dashboard_id,
        author: draft.author,
        text: draft.text,
        tags: draft.tags,
        created_at: Utc.with_ymd_and_hms(2021, 3, 1, hour, 0, 0).unwrap(),
    }
}

/// A forecast of `days` bracketed points after 2021-06-01
pub fn forecast(name: &str, days: u32) -> PredictionResult {
    let points = (1..=days)
        .map(|i| {
            let predicted = 1000.0 + f64::from(i) * 10.0;
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap() + Duration::days(i64::from(i)),
                predicted_cases: predicted,
                confidence_lower: predicted - 50.0,
                confidence_upper: predicted + 50.0,
            }
        })
        .collect();
    PredictionResult::new(
        country(name),
        ModelName::try_new("ARIMA(2,1,2)".to_string()).unwrap(),
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        1000.0,
        points,
    )
    .unwrap()
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct ScriptedApi {
    daily: Mutex<HashMap<String, Result<CountrySeries, ApiError>>>,
    mortality: Mutex<Result<MortalityAnalytics, ApiError>>,
    summaries: Mutex<HashMap<(String, CaseType), Result<f64, ApiError>>>,
    prediction: Mutex<Option<Result<PredictionResult, ApiError>>>,
    health: Mutex<Result<HealthStatus, ApiError>>,
    annotations: Mutex<Result<Vec<Annotation>, ApiError>>,
    created: Mutex<Result<AnnotationId, ApiError>>,
    upsert: Mutex<Result<UpsertOutcome, ApiError>>,
    calls: Mutex<Vec<Call>>,
    call_count: watch::Sender<usize>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: Semaphore,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedApi {
    /// Nothing scripted; every data endpoint fails with 404
    pub fn new() -> Self {
        Self {
            daily: Mutex::new(HashMap::new()),
            mortality: Mutex::new(Err(not_found("No mortality data found"))),
            summaries: Mutex::new(HashMap::new()),
            prediction: Mutex::new(None),
            health: Mutex::new(Ok(HealthStatus::new(SourceHealth::Up, SourceHealth::Up))),
            annotations: Mutex::new(Ok(Vec::new())),
            created: Mutex::new(Ok(AnnotationId::try_new("65f0c0ffee".to_string()).unwrap())),
            upsert: Mutex::new(Ok(UpsertOutcome {
                matched: 0,
                modified: 0,
                upserted_id: AnnotationId::try_new("65f0beef".to_string()).ok(),
            })),
            calls: Mutex::new(Vec::new()),
            call_count: watch::channel(0).0,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        }
    }

    /// Every standard-group country has data on every endpoint
    pub fn healthy_defaults() -> Self {
        let mut api = Self::new();
        let gdp = [46_000.0, 40_000.0, 31_000.0, 27_000.0, 42_000.0];
        let population = [83e6, 67e6, 59e6, 47e6, 67e6];
        let mut samples = Vec::new();
        for (i, name) in STANDARD_GROUP.iter().enumerate() {
            api = api
                .with_daily(name, series(name, &[3, 5, 8]))
                .with_summary(name, CaseType::Confirmed, 1_000_000.0 + i as f64)
                .with_summary(name, CaseType::Deaths, 10_000.0 + i as f64);
            samples.push(sample(name, Some(100.0 + i as f64), Some(gdp[i]), Some(population[i])));
        }
        api.with_mortality(Ok(analytics(samples)))
            .with_annotations(Ok(vec![annotation("ada", "first wave", 9)]))
    }

    pub fn with_daily(self, name: &str, series: CountrySeries) -> Self {
        self.daily.lock().insert(key(name), Ok(series));
        self
    }

    pub fn with_daily_error(self, name: &str, error: ApiError) -> Self {
        self.daily.lock().insert(key(name), Err(error));
        self
    }

    pub fn with_mortality(self, result: Result<MortalityAnalytics, ApiError>) -> Self {
        *self.mortality.lock() = result;
        self
    }

    pub fn with_summary(self, name: &str, case_type: CaseType, value: f64) -> Self {
        self.summaries.lock().insert((key(name), case_type), Ok(value));
        self
    }

    pub fn with_summary_error(self, name: &str, case_type: CaseType, error: ApiError) -> Self {
        self.summaries.lock().insert((key(name), case_type), Err(error));
        self
    }

    pub fn with_prediction(self, result: Result<PredictionResult, ApiError>) -> Self {
        *self.prediction.lock() = Some(result);
        self
    }

    pub fn with_health(self, result: Result<HealthStatus, ApiError>) -> Self {
        *self.health.lock() = result;
        self
    }

    pub fn with_annotations(self, result: Result<Vec<Annotation>, ApiError>) -> Self {
        *self.annotations.lock() = result;
        self
    }

    pub fn with_create_result(self, result: Result<AnnotationId, ApiError>) -> Self {
        *self.created.lock() = result;
        self
    }

    /// Calls block until [`ScriptedApi::open_gate`]
    pub fn gated(mut self) -> Self {
        self.gate = Semaphore::new(0);
        self
    }

    pub fn open_gate(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS - self.gate.available_permits());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn forecast_calls(&self) -> Vec<(String, u32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::PredictInfections { country, days_ahead } => Some((country.clone(), *days_ahead)),
                _ => None,
            })
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Resolves once at least `n` calls have been made
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.call_count.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    async fn enter(&self, call: Call) -> InFlight<'_> {
        self.calls.lock().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.call_count.send_modify(|count| *count += 1);

        if let Ok(permit) = self.gate.acquire().await {
            drop(permit);
        }
        InFlight {
            counter: &self.in_flight,
        }
    }
}

struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DashboardApi for ScriptedApi {
    async fn daily_deaths(&self, country: &CountryName, _year: Year) -> Result<CountrySeries, ApiError> {
        let _in_flight = self.enter(Call::DailyDeaths(country.to_string())).await;
        self.daily
            .lock()
            .get(&key(country.as_ref()))
            .cloned()
            .unwrap_or_else(|| Err(not_found("Country not found")))
    }

    async fn mortality_vs_gdp(
        &self,
        _year: Year,
        countries: &CountrySelection,
    ) -> Result<MortalityAnalytics, ApiError> {
        let names = countries.iter().map(ToString::to_string).collect();
        let _in_flight = self.enter(Call::MortalityVsGdp(names)).await;
        self.mortality.lock().clone()
    }

    async fn summary(&self, query: &SummaryQuery) -> Result<SummaryRow, ApiError> {
        let _in_flight = self
            .enter(Call::Summary {
                country: query.country.to_string(),
                case_type: query.case_type,
            })
            .await;
        let value = self
            .summaries
            .lock()
            .get(&(key(query.country.as_ref()), query.case_type))
            .cloned()
            .unwrap_or_else(|| Err(not_found("No summary data")))?;
        Ok(SummaryRow {
            country: query.country.clone(),
            case_type: query.case_type,
            range: query.range,
            value,
        })
    }

    async fn predict_infections(
        &self,
        country: &CountryName,
        days_ahead: DaysAhead,
    ) -> Result<PredictionResult, ApiError> {
        let _in_flight = self
            .enter(Call::PredictInfections {
                country: country.to_string(),
                days_ahead: days_ahead.into_inner(),
            })
            .await;
        let scripted = self.prediction.lock().clone();
        scripted.unwrap_or_else(|| Ok(forecast(country.as_ref(), days_ahead.into_inner())))
    }

    async fn health(&self, _verbose: bool) -> Result<HealthStatus, ApiError> {
        let _in_flight = self.enter(Call::Health).await;
        self.health.lock().clone()
    }

    async fn list_annotations(
        &self,
        _dashboard_id: &DashboardId,
        limit: AnnotationLimit,
    ) -> Result<Vec<Annotation>, ApiError> {
        let _in_flight = self.enter(Call::ListAnnotations).await;
        self.annotations.lock().clone().map(|mut items| {
            items.truncate(limit.into_inner() as usize);
            items
        })
    }

    async fn create_annotation(&self, _annotation: &NewAnnotation) -> Result<AnnotationId, ApiError> {
        let _in_flight = self.enter(Call::CreateAnnotation).await;
        self.created.lock().clone()
    }

    async fn upsert_country_metadata(
        &self,
        metadata: &CountryMetadata,
    ) -> Result<UpsertOutcome, ApiError> {
        let _in_flight = self
            .enter(Call::UpsertMetadata(metadata.country.to_string()))
            .await;
        self.upsert.lock().clone()
    }
}
