//! Country reference data written to the document store

use crate::domain::types::{AnnotationId, CountryName, GdpPerCapita, Population};
use crate::domain::validation::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMetadata {
    pub country: CountryName,
    pub gdp_per_capita: GdpPerCapita,
    pub population: Population,
}

impl CountryMetadata {
    /// GDP must be strictly positive here, unlike in the mortality aggregate
    pub fn new(country: &str, gdp_per_capita: f64, population: u64) -> Result<Self, ValidationError> {
        let country = CountryName::parse(country)?;
        let gdp_per_capita = GdpPerCapita::try_new(gdp_per_capita)
            .ok()
            .filter(|gdp| gdp.into_inner() > 0.0)
            .ok_or(ValidationError::InvalidMetadata {
                field: "gdp_per_capita",
            })?;
        let population = Population::try_new(population).map_err(|_| {
            ValidationError::InvalidMetadata {
                field: "population",
            }
        })?;
        Ok(Self {
            country,
            gdp_per_capita,
            population,
        })
    }
}

/// Result of an upsert as reported by the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<AnnotationId>,
}

impl UpsertOutcome {
    pub fn was_inserted(&self) -> bool {
        self.upserted_id.is_some()
    }
}
