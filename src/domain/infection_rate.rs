//! Infection rate per 100k, derived from confirmed-case totals and population

use crate::domain::panel::{EmptyReason, PanelState};
use crate::domain::types::{CountryName, Population};
use serde::{Deserialize, Serialize};

const PER_100K: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfectionRateEntry {
    pub country: CountryName,
    pub per_100k: f64,
}

impl InfectionRateEntry {
    /// `None` when the ratio is not a finite number
    pub fn derive(country: CountryName, confirmed: f64, population: Population) -> Option<Self> {
        let per_100k = confirmed / population.into_inner() as f64 * PER_100K;
        per_100k.is_finite().then_some(Self { country, per_100k })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfectionRateChart {
    entries: Vec<InfectionRateEntry>,
}

impl InfectionRateChart {
    pub fn assemble(entries: impl IntoIterator<Item = InfectionRateEntry>) -> PanelState<Self> {
        let entries: Vec<InfectionRateEntry> = entries
            .into_iter()
            .filter(|entry| entry.per_100k.is_finite())
            .collect();
        if entries.is_empty() {
            PanelState::Empty(EmptyReason::NoValidRangeData)
        } else {
            PanelState::Populated(Self { entries })
        }
    }

    pub fn entries(&self) -> &[InfectionRateEntry] {
        &self.entries
    }

    /// Entries ordered from highest to lowest rate
    pub fn ranked(&self) -> Vec<&InfectionRateEntry> {
        let mut ranked: Vec<&InfectionRateEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.per_100k.total_cmp(&a.per_100k));
        ranked
    }
}
