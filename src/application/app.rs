use crate::api::{DashboardApi, HttpDashboardApi};
use crate::application::orchestrator::{ChartOrchestrator, UpdateOutcome};
use crate::application::pollers::Pollers;
use crate::config::Settings;
use crate::domain::filter::FilterRequest;
use crate::domain::panel::PanelKind;
use crate::infrastructure::log_messages;
use crate::Result;
use std::sync::Arc;
use tracing::{info, instrument};

/// Wires configuration, HTTP client, orchestrator and pollers together
pub struct Application {
    settings: Settings,
    orchestrator: Arc<ChartOrchestrator>,
}

impl Application {
    #[instrument]
    pub async fn new() -> Result<Self> {
        info!("{}", log_messages::configuration::LOADING_CONFIG);
        let settings = Settings::new()?;
        info!("{}", log_messages::configuration::CONFIG_LOADED);
        Self::from_settings(settings)
    }

    /// Build the HTTP client from already-loaded settings
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let api = HttpDashboardApi::with_user_agent(settings.base_url()?, &settings.api.user_agent)?;
        Self::with_api(settings, Arc::new(api))
    }

    /// Build around any API implementation
    pub fn with_api(settings: Settings, api: Arc<dyn DashboardApi>) -> Result<Self> {
        let options = settings.dashboard_options()?;
        let orchestrator = Arc::new(ChartOrchestrator::new(api, options));
        Ok(Self {
            settings,
            orchestrator,
        })
    }

    /// Load the default view once, then keep the pollers running until Ctrl-C
    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        info!(base_url = %self.settings.api.base_url, "{}", log_messages::application::STARTING);

        self.initial_load().await?;
        info!("{}", log_messages::application::STARTED_SUCCESSFULLY);

        let pollers = Pollers::spawn(
            self.orchestrator.clone(),
            self.settings.health_interval()?,
            self.settings.annotations_interval()?,
        );
        info!("{}", log_messages::application::WAITING_FOR_SHUTDOWN);

        tokio::signal::ctrl_c().await?;
        info!("{}", log_messages::application::SHUTTING_DOWN);
        pollers.shutdown().await;

        info!("{}", log_messages::application::STOPPED);
        Ok(())
    }

    /// One update cycle with the default filter, plus a forecast for the first
    /// selected country
    pub async fn initial_load(&self) -> Result<()> {
        let outcome = self
            .orchestrator
            .run_update_cycle(&FilterRequest::default())
            .await?;

        if let UpdateOutcome::Completed(report) = outcome {
            if let Some(country) = report.filter.countries().first() {
                let days_ahead = self.orchestrator.options().forecast_days;
                self.orchestrator.fetch_forecast(country, days_ahead).await;
            }
        }

        let snapshot = self.orchestrator.snapshot();
        for kind in [
            PanelKind::DailyDeaths,
            PanelKind::MortalityAnalytics,
            PanelKind::InfectionRate,
            PanelKind::Demographics,
            PanelKind::SummaryTable,
            PanelKind::Forecast,
        ] {
            info!(panel = %kind, status = %snapshot.status(kind), "{}", log_messages::application::SNAPSHOT);
        }
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn orchestrator(&self) -> &Arc<ChartOrchestrator> {
        &self.orchestrator
    }
}
