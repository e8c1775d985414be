use crate::application::DashboardOptions;
use crate::domain::config_types::{BaseUrl, LogFormat, LogLevel, PollInterval};
use crate::domain::filter::{CaseType, CountrySelection, FilterDefaults, STANDARD_GROUP};
use crate::domain::types::{AnnotationLimit, DashboardId, DaysAhead, Year};
use crate::error::Error;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;

pub use config::ConfigError;

const ENV_PREFIX: &str = "COVID_DASHBOARD";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub dashboard: DashboardSettings,
    pub polling: PollingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub dashboard_id: String,
    pub default_countries: Vec<String>,
    pub default_year: i32,
    pub case_type: String,
    pub forecast_days: u32,
    pub annotation_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    pub health_interval_secs: u64,
    pub annotations_interval_secs: u64,
    pub health_verbose: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Settings {
    /// Load from `./config`, using `ENVIRONMENT` (default `development`)
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        Self::load_from(Path::new("config"), &environment)
    }

    /// Layered load: defaults, `default`, `{environment}` and `local` files
    /// from `dir` (all optional), then `COVID_DASHBOARD__SECTION__KEY`
    /// environment variables.
    pub fn load_from(dir: &Path, environment: &str) -> Result<Self, ConfigError> {
        let file = |name: &str| File::from(dir.join(name)).required(false);

        let config = Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.user_agent", crate::api::constants::DEFAULT_USER_AGENT)?
            .set_default("dashboard.dashboard_id", DashboardId::DEFAULT)?
            .set_default("dashboard.default_countries", STANDARD_GROUP.to_vec())?
            .set_default("dashboard.default_year", 2021)?
            .set_default("dashboard.case_type", CaseType::default().as_str())?
            .set_default("dashboard.forecast_days", 7)?
            .set_default("dashboard.annotation_limit", 100)?
            .set_default("polling.health_interval_secs", 30)?
            .set_default("polling.annotations_interval_secs", 45)?
            .set_default("polling.health_verbose", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(file("default"))
            .add_source(file(environment))
            .add_source(file("local"))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("dashboard.default_countries"),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn base_url(&self) -> Result<BaseUrl, Error> {
        BaseUrl::parse(&self.api.base_url).map_err(|e| Error::invalid_setting("api.base_url", e))
    }

    pub fn health_interval(&self) -> Result<PollInterval, Error> {
        PollInterval::from_secs(self.polling.health_interval_secs)
            .map_err(|e| Error::invalid_setting("polling.health_interval_secs", e))
    }

    pub fn annotations_interval(&self) -> Result<PollInterval, Error> {
        PollInterval::from_secs(self.polling.annotations_interval_secs)
            .map_err(|e| Error::invalid_setting("polling.annotations_interval_secs", e))
    }

    pub fn log_level(&self) -> Result<LogLevel, Error> {
        LogLevel::from_str(&self.logging.level)
            .map_err(|e| Error::Config(ConfigError::Message(format!("logging.level: {e}"))))
    }

    pub fn log_format(&self) -> Result<LogFormat, Error> {
        LogFormat::from_str(&self.logging.format)
            .map_err(|e| Error::Config(ConfigError::Message(format!("logging.format: {e}"))))
    }

    /// Validated runtime options for the orchestrator
    pub fn dashboard_options(&self) -> Result<DashboardOptions, Error> {
        let dashboard = &self.dashboard;
        let countries = CountrySelection::from_names(&dashboard.default_countries)
            .map_err(|e| Error::invalid_setting("dashboard.default_countries", e))?;
        let year = Year::parse(dashboard.default_year)
            .map_err(|e| Error::invalid_setting("dashboard.default_year", e))?;
        let case_type = CaseType::from_str(&dashboard.case_type)
            .map_err(|e| Error::invalid_setting("dashboard.case_type", e))?;

        Ok(DashboardOptions {
            defaults: FilterDefaults {
                countries,
                year,
                case_type,
            },
            dashboard_id: DashboardId::parse(&dashboard.dashboard_id)
                .map_err(|e| Error::invalid_setting("dashboard.dashboard_id", e))?,
            annotation_limit: AnnotationLimit::parse(dashboard.annotation_limit)
                .map_err(|e| Error::invalid_setting("dashboard.annotation_limit", e))?,
            forecast_days: DaysAhead::parse(dashboard.forecast_days)
                .map_err(|e| Error::invalid_setting("dashboard.forecast_days", e))?,
            health_verbose: self.polling.health_verbose,
        })
    }
}
