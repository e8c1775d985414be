//! Panel output slots
//!
//! Every dashboard panel is an explicit slot holding one of four states. A
//! settled panel is always populated, empty-but-valid, or errored with a
//! message; errors distinguish a panel's own failure from a failure of the
//! panel it depends on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a panel region of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    DailyDeaths,
    MortalityAnalytics,
    InfectionRate,
    Demographics,
    SummaryTable,
    Forecast,
    Health,
    Annotations,
}

impl PanelKind {
    pub fn title(&self) -> &'static str {
        match self {
            PanelKind::DailyDeaths => "daily deaths",
            PanelKind::MortalityAnalytics => "mortality vs GDP",
            PanelKind::InfectionRate => "infection rate per 100k",
            PanelKind::Demographics => "mortality by GDP bucket",
            PanelKind::SummaryTable => "summary table",
            PanelKind::Forecast => "infection forecast",
            PanelKind::Health => "service health",
            PanelKind::Annotations => "annotations",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Why a settled panel has nothing to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No series came back for any selected country
    NoData,
    /// Rates could not be computed for any country in the selected range
    NoValidRangeData,
    /// Every summary row request failed or was unusable
    NoSummaryRows,
    /// The dashboard has no annotations yet
    NoAnnotations,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoData => "No data available for the selected countries",
            EmptyReason::NoValidRangeData => "No valid data for the selected date range",
            EmptyReason::NoSummaryRows => "No summary data could be loaded",
            EmptyReason::NoAnnotations => "No annotations yet",
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Panel-scoped failure shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelError {
    /// The panel's own fetch or transformation failed
    Failed { message: String },
    /// A prerequisite panel failed, so this one never issued its requests
    BlockedOnDependency { dependency: PanelKind },
}

impl PanelError {
    pub fn failed(message: impl fmt::Display) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }

    pub fn blocked_on(dependency: PanelKind) -> Self {
        Self::BlockedOnDependency { dependency }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::BlockedOnDependency { .. })
    }
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { message } => write!(f, "{message}"),
            Self::BlockedOnDependency { dependency } => {
                write!(f, "Unavailable because {dependency} could not be loaded")
            }
        }
    }
}

/// State of a single panel slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PanelState<T> {
    Loading,
    Populated(T),
    Empty(EmptyReason),
    Error(PanelError),
}

impl<T> Default for PanelState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> PanelState<T> {
    pub fn failed(message: impl fmt::Display) -> Self {
        Self::Error(PanelError::failed(message))
    }

    pub fn blocked_on(dependency: PanelKind) -> Self {
        Self::Error(PanelError::blocked_on(dependency))
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Self::Populated(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PanelError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    pub fn status(&self) -> PanelStatus {
        match self {
            Self::Loading => PanelStatus::Loading,
            Self::Populated(_) => PanelStatus::Populated,
            Self::Empty(_) => PanelStatus::Empty,
            Self::Error(PanelError::Failed { .. }) => PanelStatus::Failed,
            Self::Error(PanelError::BlockedOnDependency { .. }) => PanelStatus::Blocked,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PanelState<U> {
        match self {
            Self::Loading => PanelState::Loading,
            Self::Populated(value) => PanelState::Populated(f(value)),
            Self::Empty(reason) => PanelState::Empty(reason),
            Self::Error(error) => PanelState::Error(error),
        }
    }

    /// User-facing message for non-populated states
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Loading => Some("Loading...".to_string()),
            Self::Populated(_) => None,
            Self::Empty(reason) => Some(reason.message().to_string()),
            Self::Error(error) => Some(error.to_string()),
        }
    }
}

/// Data-free summary of a [`PanelState`], used in cycle reports and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    Loading,
    Populated,
    Empty,
    Failed,
    Blocked,
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PanelStatus::Loading => "loading",
            PanelStatus::Populated => "populated",
            PanelStatus::Empty => "empty",
            PanelStatus::Failed => "failed",
            PanelStatus::Blocked => "blocked",
        };
        write!(f, "{label}")
    }
}
