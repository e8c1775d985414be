//! Chart orchestration
//!
//! [`ChartOrchestrator`] turns a filter into a set of parallel API requests,
//! assembles each panel off to the side and swaps the finished state into its
//! slot. Panels are fault-isolated: a failing request only ever affects the
//! panel it feeds (and, for the mortality aggregate, the panels derived from
//! it).

use crate::api::constants::endpoints;
use crate::api::{ApiError, DashboardApi};
use crate::domain::annotation::{AnnotationFeed, NewAnnotation};
use crate::domain::demography::DemographicBreakdown;
use crate::domain::filter::{CaseType, Filter, FilterDefaults, FilterRequest};
use crate::domain::health::HealthStatus;
use crate::domain::infection_rate::{InfectionRateChart, InfectionRateEntry};
use crate::domain::metadata::{CountryMetadata, UpsertOutcome};
use crate::domain::mortality::MortalityAnalytics;
use crate::domain::panel::{PanelKind, PanelState, PanelStatus};
use crate::domain::prediction::PredictionResult;
use crate::domain::series::DailyDeathsChart;
use crate::domain::summary::{SummaryQuery, SummaryTable};
use crate::domain::types::{AnnotationId, AnnotationLimit, CountryName, DashboardId, DaysAhead};
use crate::domain::validation::ValidationError;
use crate::error::SubmitAnnotationError;
use crate::infrastructure::log_messages;
use futures_util::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

/// Per-dashboard settings the orchestrator needs at runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOptions {
    pub defaults: FilterDefaults,
    pub dashboard_id: DashboardId,
    pub annotation_limit: AnnotationLimit,
    pub forecast_days: DaysAhead,
    pub health_verbose: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            defaults: FilterDefaults::default(),
            dashboard_id: DashboardId::default(),
            annotation_limit: AnnotationLimit::default(),
            forecast_days: DaysAhead::default(),
            health_verbose: false,
        }
    }
}

/// One panel region; writers replace the whole state at once
#[derive(Debug)]
pub struct PanelSlot<T> {
    state: RwLock<PanelState<T>>,
}

impl<T> Default for PanelSlot<T> {
    fn default() -> Self {
        Self {
            state: RwLock::new(PanelState::Loading),
        }
    }
}

impl<T: Clone> PanelSlot<T> {
    pub fn get(&self) -> PanelState<T> {
        self.state.read().clone()
    }

    pub fn status(&self) -> PanelStatus {
        self.state.read().status()
    }

    fn set(&self, state: PanelState<T>) {
        *self.state.write() = state;
    }
}

/// Every panel region of the dashboard
#[derive(Debug, Default)]
pub struct DashboardView {
    pub daily_deaths: PanelSlot<DailyDeathsChart>,
    pub mortality: PanelSlot<MortalityAnalytics>,
    pub infection_rate: PanelSlot<InfectionRateChart>,
    pub demographics: PanelSlot<DemographicBreakdown>,
    pub summary: PanelSlot<SummaryTable>,
    pub forecast: PanelSlot<PredictionResult>,
    pub health: PanelSlot<HealthStatus>,
    pub annotations: PanelSlot<AnnotationFeed>,
}

/// Owned copy of every panel at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub daily_deaths: PanelState<DailyDeathsChart>,
    pub mortality: PanelState<MortalityAnalytics>,
    pub infection_rate: PanelState<InfectionRateChart>,
    pub demographics: PanelState<DemographicBreakdown>,
    pub summary: PanelState<SummaryTable>,
    pub forecast: PanelState<PredictionResult>,
    pub health: PanelState<HealthStatus>,
    pub annotations: PanelState<AnnotationFeed>,
}

impl DashboardSnapshot {
    pub fn status(&self, kind: PanelKind) -> PanelStatus {
        match kind {
            PanelKind::DailyDeaths => self.daily_deaths.status(),
            PanelKind::MortalityAnalytics => self.mortality.status(),
            PanelKind::InfectionRate => self.infection_rate.status(),
            PanelKind::Demographics => self.demographics.status(),
            PanelKind::SummaryTable => self.summary.status(),
            PanelKind::Forecast => self.forecast.status(),
            PanelKind::Health => self.health.status(),
            PanelKind::Annotations => self.annotations.status(),
        }
    }
}

/// Panels written by an update cycle, in the order they are reported
pub const CYCLE_PANELS: [PanelKind; 5] = [
    PanelKind::DailyDeaths,
    PanelKind::MortalityAnalytics,
    PanelKind::InfectionRate,
    PanelKind::Demographics,
    PanelKind::SummaryTable,
];

/// What a completed cycle left behind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub filter: Filter,
    pub panels: Vec<(PanelKind, PanelStatus)>,
}

impl CycleReport {
    pub fn status(&self, kind: PanelKind) -> Option<PanelStatus> {
        self.panels
            .iter()
            .find(|(panel, _)| *panel == kind)
            .map(|(_, status)| *status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Completed(CycleReport),
    /// Another cycle was in flight; nothing was requested or written
    Busy,
}

impl UpdateOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Busy => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Holds the single-cycle flag for the lifetime of a cycle
struct CycleGuard<'a> {
    active: &'a AtomicBool,
}

impl<'a> CycleGuard<'a> {
    fn try_acquire(active: &'a AtomicBool) -> Option<Self> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { active })
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

pub struct ChartOrchestrator {
    api: Arc<dyn DashboardApi>,
    options: DashboardOptions,
    view: DashboardView,
    cycle_active: AtomicBool,
}

impl ChartOrchestrator {
    pub fn new(api: Arc<dyn DashboardApi>, options: DashboardOptions) -> Self {
        Self {
            api,
            options,
            view: DashboardView::default(),
            cycle_active: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn is_cycle_active(&self) -> bool {
        self.cycle_active.load(Ordering::Acquire)
    }

    /// Run one update cycle for `request`.
    ///
    /// Returns [`UpdateOutcome::Busy`] without touching the network or any
    /// panel when another cycle is still running. Filter validation errors are
    /// returned before any request is issued.
    pub async fn run_update_cycle(
        &self,
        request: &FilterRequest,
    ) -> Result<UpdateOutcome, ValidationError> {
        let Some(_guard) = CycleGuard::try_acquire(&self.cycle_active) else {
            debug!("{}", log_messages::cycle::SKIPPED_BUSY);
            return Ok(UpdateOutcome::Busy);
        };

        let filter = Filter::resolve(request, &self.options.defaults).inspect_err(|error| {
            warn!(%error, "{}", log_messages::cycle::FILTER_REJECTED);
        })?;
        if request.countries.iter().all(|name| name.trim().is_empty()) {
            debug!(
                countries = %filter.countries().to_query_value(),
                "{}",
                log_messages::cycle::DEFAULT_COUNTRIES_SUBSTITUTED
            );
        }

        let cycle_id = Uuid::now_v7();
        let span = info_span!("update_cycle", %cycle_id);
        let report = self.execute_cycle(cycle_id, filter).instrument(span).await;
        Ok(UpdateOutcome::Completed(report))
    }

    async fn execute_cycle(&self, cycle_id: Uuid, filter: Filter) -> CycleReport {
        info!(
            countries = %filter.countries().to_query_value(),
            year = %filter.year(),
            range = %filter.date_range(),
            case_type = %filter.case_type(),
            "{}",
            log_messages::cycle::STARTED
        );

        self.view.daily_deaths.set(PanelState::Loading);
        self.view.mortality.set(PanelState::Loading);
        self.view.infection_rate.set(PanelState::Loading);
        self.view.demographics.set(PanelState::Loading);
        self.view.summary.set(PanelState::Loading);

        tokio::join!(
            self.load_daily_deaths(&filter),
            self.load_mortality_and_dependants(&filter),
            self.load_summary_table(&filter),
        );

        let panels: Vec<(PanelKind, PanelStatus)> = CYCLE_PANELS
            .iter()
            .map(|kind| (*kind, self.panel_status(*kind)))
            .collect();
        info!(panels = ?panels, "{}", log_messages::cycle::COMPLETED);

        CycleReport {
            cycle_id,
            filter,
            panels,
        }
    }

    fn panel_status(&self, kind: PanelKind) -> PanelStatus {
        match kind {
            PanelKind::DailyDeaths => self.view.daily_deaths.status(),
            PanelKind::MortalityAnalytics => self.view.mortality.status(),
            PanelKind::InfectionRate => self.view.infection_rate.status(),
            PanelKind::Demographics => self.view.demographics.status(),
            PanelKind::SummaryTable => self.view.summary.status(),
            PanelKind::Forecast => self.view.forecast.status(),
            PanelKind::Health => self.view.health.status(),
            PanelKind::Annotations => self.view.annotations.status(),
        }
    }

    fn settle<T: Clone>(slot: &PanelSlot<T>, kind: PanelKind, state: PanelState<T>) {
        debug!(panel = ?kind, status = %state.status(), "{}", log_messages::cycle::PANEL_SETTLED);
        slot.set(state);
    }

    /// One request per country; failed countries are left out of the chart
    async fn load_daily_deaths(&self, filter: &Filter) {
        let year = filter.year();
        let requests = filter.countries().iter().map(|country| async move {
            (country, self.api.daily_deaths(country, year).await)
        });

        let series = join_all(requests)
            .await
            .into_iter()
            .filter_map(|(country, result)| match result {
                Ok(series) => {
                    if series.is_empty() {
                        debug!(%country, "{}", log_messages::fanout::COUNTRY_EMPTY);
                    }
                    Some(series)
                }
                Err(error) => {
                    warn!(%country, %error, "{}", log_messages::fanout::COUNTRY_FAILED);
                    None
                }
            });

        Self::settle(
            &self.view.daily_deaths,
            PanelKind::DailyDeaths,
            DailyDeathsChart::assemble(series),
        );
    }

    /// The aggregate feeds two derived panels; when it is unusable they are
    /// blocked rather than fetched
    async fn load_mortality_and_dependants(&self, filter: &Filter) {
        let Some(analytics) = self.load_mortality(filter).await else {
            warn!("{}", log_messages::mortality::DEPENDANTS_BLOCKED);
            Self::settle(
                &self.view.infection_rate,
                PanelKind::InfectionRate,
                PanelState::blocked_on(PanelKind::MortalityAnalytics),
            );
            Self::settle(
                &self.view.demographics,
                PanelKind::Demographics,
                PanelState::blocked_on(PanelKind::MortalityAnalytics),
            );
            return;
        };

        Self::settle(
            &self.view.demographics,
            PanelKind::Demographics,
            PanelState::Populated(DemographicBreakdown::from_samples(&analytics.samples)),
        );

        let infection_rate = self.load_infection_rate(filter, &analytics).await;
        Self::settle(&self.view.infection_rate, PanelKind::InfectionRate, infection_rate);
    }

    async fn load_mortality(&self, filter: &Filter) -> Option<MortalityAnalytics> {
        let result = self
            .api
            .mortality_vs_gdp(filter.year(), filter.countries())
            .await
            .and_then(|analytics| {
                if analytics.has_usable_mortality() {
                    Ok(analytics)
                } else {
                    warn!(
                        samples = analytics.samples.len(),
                        "{}",
                        log_messages::mortality::NO_USABLE_VALUES
                    );
                    Err(ApiError::invalid_payload(
                        endpoints::MORTALITY_VS_GDP,
                        "no usable mortality values for the selected countries",
                    ))
                }
            });

        match result {
            Ok(analytics) => {
                Self::settle(
                    &self.view.mortality,
                    PanelKind::MortalityAnalytics,
                    PanelState::Populated(analytics.clone()),
                );
                Some(analytics)
            }
            Err(error) => {
                warn!(%error, "{}", log_messages::mortality::FETCH_FAILED);
                Self::settle(
                    &self.view.mortality,
                    PanelKind::MortalityAnalytics,
                    PanelState::failed(error),
                );
                None
            }
        }
    }

    /// Confirmed-case totals over the range, divided by population
    async fn load_infection_rate(
        &self,
        filter: &Filter,
        analytics: &MortalityAnalytics,
    ) -> PanelState<InfectionRateChart> {
        let range = filter.date_range();
        let requests = filter.countries().iter().filter_map(|country| {
            let Some(population) = analytics.population_of(country) else {
                debug!(%country, "{}", log_messages::fanout::POPULATION_MISSING);
                return None;
            };
            let query = SummaryQuery::new(country.clone(), range, CaseType::Confirmed);
            Some(async move { (query.country.clone(), population, self.api.summary(&query).await) })
        });

        let entries = join_all(requests)
            .await
            .into_iter()
            .filter_map(|(country, population, result)| match result {
                Ok(row) => {
                    let entry = InfectionRateEntry::derive(country.clone(), row.value, population);
                    if entry.is_none() {
                        debug!(%country, "{}", log_messages::fanout::RATE_NOT_FINITE);
                    }
                    entry
                }
                Err(error) => {
                    warn!(%country, %error, "{}", log_messages::fanout::COUNTRY_FAILED);
                    None
                }
            });

        InfectionRateChart::assemble(entries)
    }

    /// One summary request per country for the filter's case type
    async fn load_summary_table(&self, filter: &Filter) {
        let range = filter.date_range();
        let case_type = filter.case_type();
        let requests = filter.countries().iter().map(|country| async move {
            let query = SummaryQuery::new(country.clone(), range, case_type);
            (country, self.api.summary(&query).await)
        });

        let rows = join_all(requests)
            .await
            .into_iter()
            .filter_map(|(country, result)| match result {
                Ok(row) => Some(row),
                Err(error) => {
                    warn!(%country, %error, "{}", log_messages::fanout::COUNTRY_FAILED);
                    None
                }
            });

        Self::settle(
            &self.view.summary,
            PanelKind::SummaryTable,
            SummaryTable::assemble(rows),
        );
    }

    /// Forecast panel; independent of the update cycle
    #[instrument(skip(self), fields(country = %country, days_ahead = %days_ahead))]
    pub async fn fetch_forecast(
        &self,
        country: &CountryName,
        days_ahead: DaysAhead,
    ) -> PanelState<PredictionResult> {
        self.view.forecast.set(PanelState::Loading);
        let state = match self.api.predict_infections(country, days_ahead).await {
            Ok(prediction) => PanelState::Populated(prediction),
            Err(error) => {
                warn!(%error, "{}", log_messages::auxiliary::FORECAST_FAILED);
                PanelState::failed(error)
            }
        };
        Self::settle(&self.view.forecast, PanelKind::Forecast, state.clone());
        state
    }

    /// Submit an untagged annotation to the configured dashboard
    pub async fn submit_annotation(
        &self,
        author: &str,
        text: &str,
    ) -> Result<AnnotationId, SubmitAnnotationError> {
        self.submit_tagged_annotation(author, text, Vec::<String>::new())
            .await
    }

    /// Validation happens before any request; nothing is retried.
    ///
    /// On success the annotation panel is refreshed.
    #[instrument(skip(self, author, text, tags))]
    pub async fn submit_tagged_annotation<I, S>(
        &self,
        author: &str,
        text: &str,
        tags: I,
    ) -> Result<AnnotationId, SubmitAnnotationError>
    where
        I: IntoIterator<Item = S> + Send,
        S: AsRef<str>,
    {
        let annotation = NewAnnotation::new(self.options.dashboard_id.clone(), author, text, tags)
            .inspect_err(|error| {
                debug!(%error, "{}", log_messages::annotations::SUBMIT_REJECTED);
            })?;

        let id = self
            .api
            .create_annotation(&annotation)
            .await
            .inspect_err(|error| {
                warn!(%error, "{}", log_messages::annotations::SUBMIT_FAILED);
            })?;
        info!(id = %id, "{}", log_messages::annotations::SUBMITTED);

        self.poll_annotations().await;
        Ok(id)
    }

    /// Refresh the health panel; safe to call while a cycle runs
    #[instrument(skip(self))]
    pub async fn poll_health(&self) -> PanelState<HealthStatus> {
        let state = match self.api.health(self.options.health_verbose).await {
            Ok(status) => {
                if !status.is_healthy() {
                    warn!(
                        warehouse = %status.warehouse,
                        document_store = %status.document_store,
                        "{}",
                        log_messages::auxiliary::HEALTH_DEGRADED
                    );
                }
                let unavailable: Vec<&str> = status.unavailable_data_sources().collect();
                if !unavailable.is_empty() {
                    warn!(
                        tables = ?unavailable,
                        "{}",
                        log_messages::auxiliary::DATA_SOURCES_UNAVAILABLE
                    );
                }
                PanelState::Populated(status)
            }
            Err(error) => {
                warn!(%error, "{}", log_messages::auxiliary::HEALTH_POLL_FAILED);
                PanelState::failed(error)
            }
        };
        Self::settle(&self.view.health, PanelKind::Health, state.clone());
        state
    }

    /// Refresh the annotation panel; safe to call while a cycle runs
    #[instrument(skip(self))]
    pub async fn poll_annotations(&self) -> PanelState<AnnotationFeed> {
        let state = match self
            .api
            .list_annotations(&self.options.dashboard_id, self.options.annotation_limit)
            .await
        {
            Ok(items) => AnnotationFeed::assemble(items),
            Err(error) => {
                warn!(%error, "{}", log_messages::annotations::POLL_FAILED);
                PanelState::failed(error)
            }
        };
        Self::settle(&self.view.annotations, PanelKind::Annotations, state.clone());
        state
    }

    #[instrument(skip(self, metadata), fields(country = %metadata.country))]
    pub async fn upsert_country_metadata(
        &self,
        metadata: &CountryMetadata,
    ) -> Result<UpsertOutcome, ApiError> {
        self.api
            .upsert_country_metadata(metadata)
            .await
            .inspect_err(|error| {
                warn!(%error, "{}", log_messages::auxiliary::METADATA_UPSERT_FAILED);
            })
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            daily_deaths: self.view.daily_deaths.get(),
            mortality: self.view.mortality.get(),
            infection_rate: self.view.infection_rate.get(),
            demographics: self.view.demographics.get(),
            summary: self.view.summary.get(),
            forecast: self.view.forecast.get(),
            health: self.view.health.get(),
            annotations: self.view.annotations.get(),
        }
    }
}
