//! Domain types and panel transformations for the COVID dashboard
//!
//! Everything in here is pure: validated value types, the filter model and the
//! functions that turn API results into chart-ready panel states. No module
//! here performs I/O.

pub mod annotation;
pub mod config_types;
pub mod demography;
pub mod filter;
pub mod health;
pub mod infection_rate;
pub mod metadata;
pub mod mortality;
pub mod panel;
pub mod prediction;
pub mod series;
pub mod summary;
pub mod types;
pub mod validation;

pub use annotation::{Annotation, AnnotationFeed, NewAnnotation};
pub use demography::{BucketSummary, DemographicBreakdown, GdpBucket};
pub use filter::{CaseType, CountrySelection, DateRange, Filter, FilterDefaults, FilterRequest};
pub use health::{DataSourceHealth, HealthStatus, OverallStatus, SourceHealth};
pub use infection_rate::{InfectionRateChart, InfectionRateEntry};
pub use metadata::{CountryMetadata, UpsertOutcome};
pub use mortality::{MortalityAnalytics, MortalitySample};
pub use panel::{EmptyReason, PanelError, PanelKind, PanelState, PanelStatus};
pub use prediction::{ForecastPoint, PredictionError, PredictionResult};
pub use series::{CountrySeries, DailyDeathsChart, DailySeriesPoint};
pub use summary::{SummaryQuery, SummaryRow, SummaryTable};
pub use types::*;
pub use validation::ValidationError;
