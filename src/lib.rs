//! COVID dashboard - chart orchestration for a COVID-19 analytics API
//!
//! Turns a country/date filter into parallel requests against the dashboard
//! REST API and assembles the results into independent panel states. Health
//! and annotation panels are refreshed by background pollers.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use api::{ApiError, DashboardApi, HttpDashboardApi};
pub use application::{Application, ChartOrchestrator, DashboardOptions, DashboardSnapshot, UpdateOutcome};
pub use config::Settings;
pub use error::{Error, Result, SubmitAnnotationError};
