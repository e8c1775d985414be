//! Reachability of the two backing data sources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceHealth {
    Up,
    Down { reason: Option<String> },
}

impl SourceHealth {
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

impl fmt::Display for SourceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down { reason: Some(reason) } => write!(f, "down ({reason})"),
            Self::Down { reason: None } => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
        }
    }
}

impl std::str::FromStr for OverallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthy" => Ok(Self::Healthy),
            "degraded" => Ok(Self::Degraded),
            other => Err(format!("unknown overall status: {other}")),
        }
    }
}

/// Availability of one warehouse table, reported only by verbose health checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataSourceHealth {
    Available { row_count: u64 },
    Unavailable { error: Option<String> },
}

impl DataSourceHealth {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

impl fmt::Display for DataSourceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available { row_count } => write!(f, "available ({row_count} rows)"),
            Self::Unavailable { error: Some(error) } => write!(f, "unavailable ({error})"),
            Self::Unavailable { error: None } => write!(f, "unavailable"),
        }
    }
}

/// Health of the analytics warehouse and the annotation document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub warehouse: SourceHealth,
    pub document_store: SourceHealth,
    pub overall: OverallStatus,
    pub version: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
    /// Per-table availability keyed by table name; empty unless verbose
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSourceHealth>,
}

impl HealthStatus {
    /// Overall status starts derived: healthy only when both sources are up
    pub fn new(warehouse: SourceHealth, document_store: SourceHealth) -> Self {
        let overall = if warehouse.is_up() && document_store.is_up() {
            OverallStatus::Healthy
        } else {
            OverallStatus::Degraded
        };
        Self {
            warehouse,
            document_store,
            overall,
            version: None,
            checked_at: None,
            data_sources: BTreeMap::new(),
        }
    }

    /// Replace the derived status with the one the server reported
    pub fn with_overall(mut self, overall: OverallStatus) -> Self {
        self.overall = overall;
        self
    }

    pub fn with_data_source(mut self, table: impl Into<String>, health: DataSourceHealth) -> Self {
        self.data_sources.insert(table.into(), health);
        self
    }

    pub fn unavailable_data_sources(&self) -> impl Iterator<Item = &str> {
        self.data_sources
            .iter()
            .filter(|(_, health)| !health.is_available())
            .map(|(table, _)| table.as_str())
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_checked_at(mut self, checked_at: DateTime<Utc>) -> Self {
        self.checked_at = Some(checked_at);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.overall == OverallStatus::Healthy
    }
}
