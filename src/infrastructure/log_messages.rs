//! Log message constants
//!
//! Messages are fixed strings; the variable parts of an event are attached as
//! structured tracing fields (`country`, `panel`, `error`, ...) rather than
//! formatted into the text.

/// Application startup and lifecycle messages
pub mod application {
    pub const STARTING: &str = "Starting COVID dashboard orchestrator";
    pub const STARTED_SUCCESSFULLY: &str = "Dashboard initialised";
    pub const SNAPSHOT: &str = "Dashboard snapshot after initial load";
    pub const WAITING_FOR_SHUTDOWN: &str = "Pollers running; press Ctrl-C to stop";
    pub const SHUTTING_DOWN: &str = "Shutdown signal received, stopping pollers";
    pub const STOPPED: &str = "Dashboard orchestrator stopped";
}

/// Update cycle messages
pub mod cycle {
    pub const STARTED: &str = "Update cycle started";
    pub const COMPLETED: &str = "Update cycle completed";
    pub const SKIPPED_BUSY: &str = "Update cycle already in progress; request ignored";
    pub const FILTER_REJECTED: &str = "Filter rejected before any request was issued";
    pub const DEFAULT_COUNTRIES_SUBSTITUTED: &str =
        "No countries selected; substituting the default group";
    pub const PANEL_SETTLED: &str = "Panel settled";
}

/// Per-request failures inside a fan-out step
pub mod fanout {
    pub const COUNTRY_FAILED: &str = "Request for country failed; omitting it from the panel";
    pub const COUNTRY_EMPTY: &str = "Country returned an empty series";
    pub const SERVER_REPORTED_ERROR: &str = "Server reported an error alongside an empty series";
    pub const POPULATION_MISSING: &str = "No population known for country; skipping rate";
    pub const RATE_NOT_FINITE: &str = "Infection rate is not finite; dropping entry";
}

/// Mortality aggregate and its dependants
pub mod mortality {
    pub const FETCH_FAILED: &str = "Mortality aggregate request failed";
    pub const NO_USABLE_VALUES: &str = "Mortality aggregate has no usable numeric values";
    pub const DEPENDANTS_BLOCKED: &str = "Dependent panels blocked on mortality aggregate";
}

/// Annotation messages
pub mod annotations {
    pub const SUBMIT_REJECTED: &str = "Annotation rejected locally";
    pub const SUBMIT_FAILED: &str = "Annotation submission failed";
    pub const SUBMITTED: &str = "Annotation stored";
    pub const POLL_FAILED: &str = "Annotation poll failed";
    pub const SKIPPED_INVALID: &str = "Skipping stored annotation that fails validation";
}

/// Health, forecast and metadata messages
pub mod auxiliary {
    pub const HEALTH_POLL_FAILED: &str = "Health poll failed";
    pub const HEALTH_DEGRADED: &str = "Data sources degraded";
    pub const DATA_SOURCES_UNAVAILABLE: &str = "Warehouse tables unavailable";
    pub const FORECAST_FAILED: &str = "Forecast request failed";
    pub const METADATA_UPSERT_FAILED: &str = "Country metadata upsert failed";
}

/// Background poller messages
pub mod pollers {
    pub const STARTED: &str = "Poller started";
    pub const STOPPED: &str = "Poller stopped";
    pub const TASK_FAILED: &str = "Poller task ended abnormally";
}

/// Configuration messages
pub mod configuration {
    pub const LOADING_CONFIG: &str = "Loading configuration";
    pub const CONFIG_LOADED: &str = "Configuration loaded successfully";
}
