//! Daily death series for the time-series chart

use crate::domain::panel::{EmptyReason, PanelState};
use crate::domain::types::CountryName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of newly reported deaths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub deaths: u64,
}

/// Date-ordered series for a single country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySeries {
    country: CountryName,
    points: Vec<DailySeriesPoint>,
}

impl CountrySeries {
    /// Points are sorted by date; duplicate dates keep the first occurrence
    pub fn new(country: CountryName, mut points: Vec<DailySeriesPoint>) -> Self {
        points.sort_by_key(|point| point.date);
        points.dedup_by_key(|point| point.date);
        Self { country, points }
    }

    pub fn country(&self) -> &CountryName {
        &self.country
    }

    pub fn points(&self) -> &[DailySeriesPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_deaths(&self) -> u64 {
        self.points.iter().map(|point| point.deaths).sum()
    }

    pub fn peak(&self) -> Option<&DailySeriesPoint> {
        self.points.iter().max_by_key(|point| point.deaths)
    }
}

/// Chart-ready collection of per-country series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDeathsChart {
    series: Vec<CountrySeries>,
}

impl DailyDeathsChart {
    /// Merge whatever series arrived; empty ones are dropped, and a chart with
    /// nothing left renders as "no data"
    pub fn assemble(series: impl IntoIterator<Item = CountrySeries>) -> PanelState<Self> {
        let series: Vec<CountrySeries> = series.into_iter().filter(|s| !s.is_empty()).collect();
        if series.is_empty() {
            PanelState::Empty(EmptyReason::NoData)
        } else {
            PanelState::Populated(Self { series })
        }
    }

    pub fn series(&self) -> &[CountrySeries] {
        &self.series
    }

    pub fn countries(&self) -> impl Iterator<Item = &CountryName> {
        self.series.iter().map(CountrySeries::country)
    }

    /// Union of all dates present in any series, ascending
    pub fn date_axis(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.date))
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }
}
