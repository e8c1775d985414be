//! Mortality-versus-economy aggregate
//!
//! One aggregate per cycle feeds three panels: the analytics panel itself,
//! the infection-rate derivation (for populations) and the GDP buckets.

use crate::domain::types::{CountryName, DeathsPer100k, GdpPerCapita, Population};
use serde::{Deserialize, Serialize};

/// Per-country record of the aggregate; any measure may be missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalitySample {
    pub country: CountryName,
    pub deaths_per_100k: Option<DeathsPer100k>,
    pub gdp_per_capita: Option<GdpPerCapita>,
    pub population: Option<Population>,
}

impl MortalitySample {
    /// Build from raw numbers; NaN, infinite, negative or non-positive values become absent
    pub fn from_raw(
        country: CountryName,
        deaths_per_100k: Option<f64>,
        gdp_per_capita: Option<f64>,
        population: Option<f64>,
    ) -> Self {
        Self {
            country,
            deaths_per_100k: deaths_per_100k.and_then(|v| DeathsPer100k::try_new(v).ok()),
            gdp_per_capita: gdp_per_capita.and_then(|v| GdpPerCapita::try_new(v).ok()),
            population: population
                .filter(|v| v.is_finite() && *v >= 1.0)
                .and_then(|v| Population::try_new(v.round() as u64).ok()),
        }
    }

    pub fn has_mortality(&self) -> bool {
        self.deaths_per_100k.is_some()
    }
}

/// The full aggregate response for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityAnalytics {
    pub year: i32,
    pub n_countries: u32,
    pub pearson_corr: Option<f64>,
    pub slope_per_1k_gdp: Option<f64>,
    pub samples: Vec<MortalitySample>,
}

impl MortalityAnalytics {
    /// At least one sample carries a numeric mortality value
    pub fn has_usable_mortality(&self) -> bool {
        self.samples.iter().any(MortalitySample::has_mortality)
    }

    /// Samples with a mortality value, i.e. the points of the scatter chart
    pub fn plotted(&self) -> impl Iterator<Item = &MortalitySample> {
        self.samples.iter().filter(|s| s.has_mortality())
    }

    pub fn population_of(&self, country: &CountryName) -> Option<Population> {
        self.samples
            .iter()
            .find(|sample| sample.country.matches(country.as_ref()))
            .and_then(|sample| sample.population)
    }

    /// Correlation strength label for the reported Pearson coefficient
    pub fn correlation_strength(&self) -> Option<CorrelationStrength> {
        self.pearson_corr
            .filter(|r| r.is_finite())
            .map(CorrelationStrength::from_coefficient)
    }
}

/// Qualitative strength of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Negligible,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let r = r.abs();
        if r < 0.1 {
            Self::Negligible
        } else if r < 0.3 {
            Self::Weak
        } else if r < 0.5 {
            Self::Moderate
        } else if r < 0.7 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }
}
