//! Paths, query keys and fixed values of the dashboard REST contract

/// Endpoint paths relative to the API base URL
pub mod paths {
    pub const DAILY_DEATHS: &str = "/covid/daily_deaths";
    pub const SUMMARY: &str = "/covid/summary";
    pub const MORTALITY_VS_GDP: &str = "/analytics/mortality-vs-gdp";
    pub const PREDICT_INFECTIONS: &str = "/analytics/predict-infections";
    pub const HEALTH: &str = "/health";
    pub const ANNOTATIONS: &str = "/annotations";
    pub const COUNTRY_METADATA: &str = "/metadata/country";
}

/// Query-string parameter names
pub mod query {
    pub const COUNTRY: &str = "country";
    pub const COUNTRIES: &str = "countries";
    pub const YEAR: &str = "year";
    pub const DATE_FROM: &str = "date_from";
    pub const DATE_TO: &str = "date_to";
    pub const CASE_TYPE: &str = "case_type";
    pub const DAYS_AHEAD: &str = "days_ahead";
    pub const VERBOSE: &str = "verbose";
    pub const DASHBOARD_ID: &str = "dashboard_id";
    pub const LIMIT: &str = "limit";
}

/// Error body handling
pub mod errors {
    /// Field carrying the server's error message
    pub const DETAIL_FIELD: &str = "detail";

    /// Used when an error body has no usable `detail`
    pub const UNKNOWN_ERROR: &str = "Unknown error";
}

/// Endpoint labels used in errors and log fields
pub mod endpoints {
    pub const DAILY_DEATHS: &str = "daily_deaths";
    pub const SUMMARY: &str = "summary";
    pub const MORTALITY_VS_GDP: &str = "mortality_vs_gdp";
    pub const PREDICT_INFECTIONS: &str = "predict_infections";
    pub const HEALTH: &str = "health";
    pub const LIST_ANNOTATIONS: &str = "list_annotations";
    pub const CREATE_ANNOTATION: &str = "create_annotation";
    pub const COUNTRY_METADATA: &str = "country_metadata";
}

pub const DEFAULT_USER_AGENT: &str = concat!("covid_dashboard/", env!("CARGO_PKG_VERSION"));
