//! Application services and panel orchestration
//!
//! This module wires the API client to the panel state and runs the
//! background pollers.

pub mod app;
pub mod orchestrator;
pub mod pollers;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
mod orchestrator_tests;

pub use app::Application;
pub use orchestrator::{
    ChartOrchestrator, CycleReport, DashboardOptions, DashboardSnapshot, DashboardView, PanelSlot,
    UpdateOutcome,
};
pub use pollers::Pollers;
