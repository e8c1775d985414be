//! Server-side infection forecast

use crate::domain::types::{CountryName, ModelName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_cases: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

impl ForecastPoint {
    pub fn is_bracketed(&self) -> bool {
        self.confidence_lower <= self.predicted_cases && self.predicted_cases <= self.confidence_upper
    }

    pub fn interval_width(&self) -> f64 {
        self.confidence_upper - self.confidence_lower
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Forecast contains no predictions")]
    NoPredictions,

    #[error("Forecast for {date} has non-finite values")]
    NonFinite { date: NaiveDate },

    #[error("Forecast for {date} is outside its confidence interval")]
    UnbracketedPrediction { date: NaiveDate },

    #[error("Forecast dates are not strictly increasing at {date}")]
    UnorderedDates { date: NaiveDate },
}

/// A forecast whose points are date-ordered and bracketed by their bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    country: CountryName,
    model: ModelName,
    last_observed_date: NaiveDate,
    last_observed_value: f64,
    predictions: Vec<ForecastPoint>,
}

impl PredictionResult {
    pub fn new(
        country: CountryName,
        model: ModelName,
        last_observed_date: NaiveDate,
        last_observed_value: f64,
        predictions: Vec<ForecastPoint>,
    ) -> Result<Self, PredictionError> {
        if predictions.is_empty() {
            return Err(PredictionError::NoPredictions);
        }

        let mut previous: Option<NaiveDate> = None;
        for point in &predictions {
            let values = [
                point.predicted_cases,
                point.confidence_lower,
                point.confidence_upper,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(PredictionError::NonFinite { date: point.date });
            }
            if !point.is_bracketed() {
                return Err(PredictionError::UnbracketedPrediction { date: point.date });
            }
            if previous.is_some_and(|prev| point.date <= prev) {
                return Err(PredictionError::UnorderedDates { date: point.date });
            }
            previous = Some(point.date);
        }

        Ok(Self {
            country,
            model,
            last_observed_date,
            last_observed_value,
            predictions,
        })
    }

    pub fn country(&self) -> &CountryName {
        &self.country
    }

    pub fn model(&self) -> &ModelName {
        &self.model
    }

    pub fn last_observed_date(&self) -> NaiveDate {
        self.last_observed_date
    }

    pub fn last_observed_value(&self) -> f64 {
        self.last_observed_value
    }

    pub fn predictions(&self) -> &[ForecastPoint] {
        &self.predictions
    }

    pub fn horizon(&self) -> usize {
        self.predictions.len()
    }
}
